//! Real CommandRunner backed by tokio::process.

use crate::domain::command::MediaCommand;
use crate::ports::process::CommandRunner;
use async_trait::async_trait;
use std::io;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command as TokioCommand;

/// Spawns the described program and waits for it, capturing both output
/// streams. With no timeout configured a hung tool blocks the calling
/// worker indefinitely; `with_timeout` turns that into an error after the
/// given duration.
#[derive(Clone, Copy, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, cmd: &MediaCommand) -> io::Result<Output> {
        let mut command = TokioCommand::new(cmd.program);
        command.args(&cmd.args).kill_on_drop(true);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("{} did not finish within {:?}", cmd.program, limit),
                    )
                })?,
            None => command.output().await,
        }
    }
}
