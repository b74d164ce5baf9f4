use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transcode the source into the multi-variant HLS bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConvertHlsJob {
    pub video_id: String,
    pub source_path: PathBuf,
}

/// Extract a representative still frame and persist its public URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractThumbnailJob {
    pub video_id: String,
    pub source_path: PathBuf,
}

/// The two units of work a dispatcher may hand to a worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Job {
    ConvertHls(ConvertHlsJob),
    ExtractThumbnail(ExtractThumbnailJob),
}

/// Catalog entry for an uploaded video, owned by the repository port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub source_path: PathBuf,
    pub thumbnail_url: Option<String>,
}
