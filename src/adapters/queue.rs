//! In-process JobQueuePort over a tokio mpsc channel.
//!
//! Monolith-mode stand-in for an external queue service. Scheduling and
//! retry stay outside this crate either way; this adapter only moves job
//! payloads from the ingest side to the workers. Payloads cross the
//! channel as the same JSON messages a broker-backed queue would carry,
//! so the wire format is exercised even in monolith mode.

use crate::domain::jobs::Job;
use crate::ports::queue::JobQueuePort;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct ChannelQueue {
    tx: Sender<String>,
    rx: Arc<Mutex<Receiver<String>>>,
}

impl ChannelQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel(capacity);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

#[async_trait]
impl JobQueuePort for ChannelQueue {
    async fn enqueue_job(&self, job: Job) -> Result<(), Box<dyn Error + Send + Sync>> {
        let payload = serde_json::to_string(&job)?;
        self.tx
            .send(payload)
            .await
            .map_err(|_| Box::<dyn Error + Send + Sync>::from("job queue closed"))
    }

    async fn dequeue_job(
        &self,
        timeout_secs: f64,
    ) -> Result<Option<Job>, Box<dyn Error + Send + Sync>> {
        let mut rx = self.rx.lock().await;
        let payload = if timeout_secs > 0.0 {
            match tokio::time::timeout(Duration::from_secs_f64(timeout_secs), rx.recv()).await {
                Ok(payload) => payload,
                Err(_) => None,
            }
        } else {
            rx.recv().await
        };
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}
