//! The transcode job: audio detection, HLS conversion and thumbnail
//! extraction, persisting the thumbnail URL through the repository port.

use crate::domain::command::{
    audio_probe_command, hls_encode_command, thumbnail_command, MediaCommand,
};
use crate::domain::hls::prepare_output_layout;
use crate::ports::process::CommandRunner;
use crate::ports::repository::VideoRepository;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for transcode operations.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The external tool exited with a non-zero status.
    #[error("{program} failed with exit code {code}: {stderr}")]
    CommandFailed {
        program: &'static str,
        code: i32,
        stderr: String,
    },

    /// The external tool was killed by a signal.
    #[error("{program} was terminated by signal")]
    Terminated { program: &'static str },

    /// Spawn or filesystem failure, propagated unmodified.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The repository rejected the thumbnail URL update.
    #[error("failed to persist thumbnail URL: {0}")]
    Persist(String),
}

/// Media path/URL settings the job needs to place thumbnails and compute
/// their public URLs.
#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// Root directory holding uploaded videos and thumbnails
    pub media_root: PathBuf,
    /// Public origin, e.g. `https://cdn.example`
    pub base_url: String,
    /// URL prefix under which `media_root` is served, e.g. `/media/`
    pub media_url: String,
}

/// Runs transcode jobs against injected collaborators: a command runner
/// for the external tools and a repository for the catalog record.
pub struct Transcoder<R, V> {
    runner: R,
    repo: V,
    media: MediaConfig,
}

impl<R, V> Transcoder<R, V>
where
    R: CommandRunner,
    V: VideoRepository,
{
    pub fn new(runner: R, repo: V, media: MediaConfig) -> Self {
        Self {
            runner,
            repo,
            media,
        }
    }

    /// Best-effort audio detection: true iff the probe exits successfully
    /// and prints at least one stream index. Probe failures of any kind
    /// count as "no audio" and are never surfaced.
    pub async fn has_audio_stream(&self, source: &Path) -> bool {
        let cmd = audio_probe_command(source);
        match self.runner.run(&cmd).await {
            Ok(output) if output.status.success() => {
                !String::from_utf8_lossy(&output.stdout).trim().is_empty()
            }
            _ => false,
        }
    }

    /// Entry point one: transcode the source into the three-variant HLS
    /// bundle next to it. The first subprocess failure aborts the job;
    /// partially written output stays on disk until the next run
    /// overwrites it.
    pub async fn convert_to_hls(&self, source: &Path) -> Result<(), TranscodeError> {
        let hls_dir = prepare_output_layout(source)?;
        let has_audio = self.has_audio_stream(source).await;

        tracing::info!(
            source = %source.display(),
            hls_dir = %hls_dir.display(),
            has_audio,
            "starting HLS conversion"
        );

        let cmd = hls_encode_command(source, &hls_dir, has_audio);
        self.run_checked(&cmd).await
    }

    /// Entry point two: grab one still frame, then persist its public URL
    /// to the record identified by `video_id`.
    pub async fn extract_thumbnail(
        &self,
        video_id: &str,
        source: &Path,
    ) -> Result<(), TranscodeError> {
        let thumbnail_dir = self.media.media_root.join("thumbnail");
        std::fs::create_dir_all(&thumbnail_dir)?;

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("video"));
        let output = thumbnail_dir.join(format!("{}.jpg", stem));

        let cmd = thumbnail_command(source, &output);
        self.run_checked(&cmd).await?;

        let url = self.public_media_url(&output);
        tracing::info!(video_id, url = %url, "thumbnail extracted");

        self.repo
            .set_thumbnail_url(video_id, &url)
            .await
            .map_err(|e| TranscodeError::Persist(e.to_string()))
    }

    /// Public URL for a file under the media root:
    /// `{base_url}{media_url}{relative_path}` with separators normalized
    /// to `/` regardless of platform.
    pub fn public_media_url(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.media.media_root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        format!(
            "{}{}{}",
            self.media.base_url,
            self.media.media_url,
            relative.trim_start_matches('/')
        )
    }

    /// Run a command and translate a non-zero exit into an error carrying
    /// the exit code and the trimmed captured stderr.
    async fn run_checked(&self, cmd: &MediaCommand) -> Result<(), TranscodeError> {
        let output = self.runner.run(cmd).await?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(code) => Err(TranscodeError::CommandFailed {
                program: cmd.program,
                code,
                stderr,
            }),
            None => Err(TranscodeError::Terminated {
                program: cmd.program,
            }),
        }
    }
}
