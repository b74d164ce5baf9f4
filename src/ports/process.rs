use crate::domain::command::MediaCommand;
use async_trait::async_trait;
use std::io;
use std::process::Output;

/// Seam between command construction and process execution, so the
/// transcode pipeline is testable without ffmpeg/ffprobe installed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing stdout and stderr.
    async fn run(&self, cmd: &MediaCommand) -> io::Result<Output>;
}
