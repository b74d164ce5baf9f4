//! Upload registration: persist the catalog record, then enqueue the
//! transcode jobs synchronously so the caller observes enqueue failures.
//! This replaces the implicit post-save trigger an earlier revision used.

use crate::domain::jobs::{ConvertHlsJob, ExtractThumbnailJob, Job, VideoRecord};
use crate::ports::queue::JobQueuePort;
use crate::ports::repository::VideoRepository;
use std::error::Error;
use std::path::Path;
use uuid::Uuid;

pub struct IngestService<Q, V> {
    queue: Q,
    repo: V,
}

impl<Q, V> IngestService<Q, V>
where
    Q: JobQueuePort,
    V: VideoRepository,
{
    pub fn new(queue: Q, repo: V) -> Self {
        Self { queue, repo }
    }

    /// Register an uploaded video and dispatch both jobs for it. The
    /// record is created first; only after that succeeds are the jobs
    /// enqueued. Returns the new video id.
    pub async fn register_upload(
        &self,
        title: &str,
        source_path: &Path,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let video = VideoRecord {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            source_path: source_path.to_path_buf(),
            thumbnail_url: None,
        };
        self.repo.create(&video).await?;

        self.queue
            .enqueue_job(Job::ConvertHls(ConvertHlsJob {
                video_id: video.id.clone(),
                source_path: source_path.to_path_buf(),
            }))
            .await?;
        self.queue
            .enqueue_job(Job::ExtractThumbnail(ExtractThumbnailJob {
                video_id: video.id.clone(),
                source_path: source_path.to_path_buf(),
            }))
            .await?;

        tracing::info!(video_id = %video.id, source = %source_path.display(), "upload registered");
        Ok(video.id)
    }
}
