//! Environment configuration.

use crate::application::transcoder::MediaConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Root directory for uploads, HLS bundles and thumbnails
    pub media_root: PathBuf,
    /// URL prefix under which media_root is served
    pub media_url: String,
    /// Public origin used when computing thumbnail URLs
    pub base_url: String,
    /// Number of transcode workers to spawn
    pub workers: usize,
    /// Upper bound on a single ffmpeg/ffprobe run; unset means unbounded
    pub tool_timeout: Option<Duration>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let addr = env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1"));
        let port = env::var("PORT").unwrap_or_else(|_| String::from("3000"));
        let base_url = env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", addr, port));

        Self {
            media_root: PathBuf::from(
                env::var("MEDIA_ROOT").unwrap_or_else(|_| String::from("./media")),
            ),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| String::from("/media/")),
            base_url,
            workers: env::var("WORKERS")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(2),
            tool_timeout: env::var("TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .map(Duration::from_secs),
            addr,
            port,
        }
    }

    /// The subset of settings the transcoder needs.
    pub fn media_config(&self) -> MediaConfig {
        MediaConfig {
            media_root: self.media_root.clone(),
            base_url: self.base_url.clone(),
            media_url: self.media_url.clone(),
        }
    }
}
