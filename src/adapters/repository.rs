//! In-memory VideoRepository for monolith mode and tests.

use crate::domain::jobs::VideoRecord;
use crate::ports::repository::VideoRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<String, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: &VideoRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut videos = self.videos.lock().expect("video map poisoned");
        videos.insert(video.id.clone(), video.clone());
        Ok(())
    }

    async fn get(
        &self,
        video_id: &str,
    ) -> Result<Option<VideoRecord>, Box<dyn Error + Send + Sync>> {
        let videos = self.videos.lock().expect("video map poisoned");
        Ok(videos.get(video_id).cloned())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>, Box<dyn Error + Send + Sync>> {
        let videos = self.videos.lock().expect("video map poisoned");
        let mut all: Vec<VideoRecord> = videos.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn set_thumbnail_url(
        &self,
        video_id: &str,
        url: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut videos = self.videos.lock().expect("video map poisoned");
        match videos.get_mut(video_id) {
            Some(video) => {
                video.thumbnail_url = Some(url.to_string());
                Ok(())
            }
            None => Err(format!("unknown video id: {}", video_id).into()),
        }
    }
}
