//! Worker loop: dequeue jobs and dispatch them to the transcoder.

use crate::application::transcoder::{TranscodeError, Transcoder};
use crate::domain::jobs::Job;
use crate::ports::process::CommandRunner;
use crate::ports::queue::JobQueuePort;
use crate::ports::repository::VideoRepository;
use std::sync::Arc;

pub struct WorkerService<Q, R, V> {
    queue: Q,
    transcoder: Arc<Transcoder<R, V>>,
}

impl<Q, R, V> WorkerService<Q, R, V>
where
    Q: JobQueuePort + Clone + 'static,
    R: CommandRunner + 'static,
    V: VideoRepository + 'static,
{
    pub fn new(queue: Q, transcoder: Arc<Transcoder<R, V>>) -> Self {
        Self { queue, transcoder }
    }

    /// Consume jobs until the queue closes. One job at a time per worker;
    /// the queue decides how many workers run in parallel. A failed job is
    /// logged and the loop moves on - retry policy belongs to the queue,
    /// not to this unit.
    pub async fn run_worker_loop(&self, worker_id: usize) {
        tracing::info!(worker_id, "worker started");
        loop {
            match self.queue.dequeue_job(0.0).await {
                Ok(Some(job)) => {
                    if let Err(e) = self.process_job(&job).await {
                        tracing::error!(worker_id, error = %e, "job failed");
                    }
                }
                Ok(None) => {
                    tracing::info!(worker_id, "queue closed, worker stopping");
                    break;
                }
                Err(e) => {
                    tracing::error!(worker_id, error = %e, "queue error");
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Dispatch one job to the matching transcoder entry point.
    pub async fn process_job(&self, job: &Job) -> Result<(), TranscodeError> {
        match job {
            Job::ConvertHls(convert) => {
                self.transcoder.convert_to_hls(&convert.source_path).await
            }
            Job::ExtractThumbnail(thumb) => {
                self.transcoder
                    .extract_thumbnail(&thumb.video_id, &thumb.source_path)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::queue::ChannelQueue;
    use crate::adapters::repository::InMemoryVideoRepository;
    use crate::application::transcoder::MediaConfig;
    use crate::domain::command::MediaCommand;
    use crate::domain::jobs::ConvertHlsJob;
    use crate::ports::process::MockCommandRunner;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};
    use tempfile::tempdir;

    fn ok_output() -> Output {
        Output {
            status: ExitStatus::from_raw(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_process_job_runs_hls_conversion() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("clip.mp4");

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd: &MediaCommand| cmd.program == "ffprobe")
            .times(1)
            .returning(|_| Ok(ok_output()));
        runner
            .expect_run()
            .withf(|cmd: &MediaCommand| cmd.program == "ffmpeg")
            .times(1)
            .returning(|_| Ok(ok_output()));

        let transcoder = Arc::new(Transcoder::new(
            runner,
            InMemoryVideoRepository::new(),
            MediaConfig {
                media_root: tmp.path().to_path_buf(),
                base_url: String::from("http://127.0.0.1:3000"),
                media_url: String::from("/media/"),
            },
        ));
        let worker = WorkerService::new(ChannelQueue::new(1), transcoder);

        let job = Job::ConvertHls(ConvertHlsJob {
            video_id: String::from("vid-1"),
            source_path: source.clone(),
        });
        worker.process_job(&job).await.unwrap();

        assert!(tmp.path().join("clip_hls").join("720p").is_dir());
    }
}
