use crate::domain::jobs::VideoRecord;
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Register a newly uploaded video
    async fn create(&self, video: &VideoRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Fetch a video by id
    async fn get(
        &self,
        video_id: &str,
    ) -> Result<Option<VideoRecord>, Box<dyn Error + Send + Sync>>;

    /// List the whole catalog
    async fn list(&self) -> Result<Vec<VideoRecord>, Box<dyn Error + Send + Sync>>;

    /// Targeted partial update: only the thumbnail URL field changes
    async fn set_thumbnail_url(
        &self,
        video_id: &str,
        url: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
