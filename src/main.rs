use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    BoxError, Json, Router,
};
use futures::{Stream, TryStreamExt};
use martino::adapters::process::ProcessRunner;
use martino::adapters::queue::ChannelQueue;
use martino::adapters::repository::InMemoryVideoRepository;
use martino::application::ingest::IngestService;
use martino::application::worker::WorkerService;
use martino::domain::hls::{
    hls_dir_for, is_valid_resolution, is_valid_segment_name, MASTER_PLAYLIST, VARIANT_PLAYLIST,
};
use martino::domain::jobs::VideoRecord;
use martino::ports::repository::VideoRepository;
use martino::{AppConfig, Transcoder};
use serde::Serialize;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;

const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

#[derive(Clone)]
struct AppState {
    config: AppConfig,
    repo: InMemoryVideoRepository,
    ingest: Arc<IngestService<ChannelQueue, InMemoryVideoRepository>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    tokio::fs::create_dir_all(config.media_root.join("videos"))
        .await
        .expect("Failed to create media directories");

    let queue = ChannelQueue::new(64);
    let repo = InMemoryVideoRepository::new();
    let runner = match config.tool_timeout {
        Some(limit) => ProcessRunner::with_timeout(limit),
        None => ProcessRunner::new(),
    };
    let transcoder = Arc::new(Transcoder::new(runner, repo.clone(), config.media_config()));

    for worker_id in 0..config.workers {
        let worker = WorkerService::new(queue.clone(), transcoder.clone());
        tokio::spawn(async move {
            worker.run_worker_loop(worker_id).await;
        });
    }

    let state = AppState {
        config: config.clone(),
        repo: repo.clone(),
        ingest: Arc::new(IngestService::new(queue, repo)),
    };

    let app = Router::new()
        .route("/upload", post(upload_media))
        .layer(DefaultBodyLimit::disable())
        .route("/video", get(list_videos))
        .route("/video/:video_id/master.m3u8", get(master_playlist))
        .route("/video/:video_id/:resolution/index.m3u8", get(variant_playlist))
        .route("/video/:video_id/:resolution/:segment", get(hls_segment))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    video_ids: Vec<String>,
}

// Handler that accepts a multipart form upload, streams each field to a
// file under media_root/videos and registers the video for transcoding.
async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, String)> {
    let upload_dir = state.config.media_root.join("videos");
    let mut video_ids = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let file_name = if let Some(file_name) = field.file_name() {
            file_name.to_owned()
        } else {
            continue;
        };

        if !file_name_is_valid(&file_name) {
            return Err((StatusCode::BAD_REQUEST, "Invalid file name".to_owned()));
        }

        let path = upload_dir.join(&file_name);
        tracing::info!(path = %path.display(), "saving upload");
        stream_to_file(&path, field).await?;

        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        let video_id = state
            .ingest
            .register_upload(&title, &path)
            .await
            .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
        video_ids.push(video_id);
    }

    if video_ids.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No file field in upload".to_owned()));
    }

    Ok((StatusCode::CREATED, Json(UploadResponse { video_ids })))
}

#[derive(Debug, Serialize)]
struct VideoSummary {
    id: String,
    title: String,
    thumbnail_url: Option<String>,
}

impl From<VideoRecord> for VideoSummary {
    fn from(record: VideoRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            thumbnail_url: record.thumbnail_url,
        }
    }
}

// Catalog listing: every known video with its thumbnail, if extraction
// has finished.
async fn list_videos(State(state): State<AppState>) -> Result<Json<Vec<VideoSummary>>, StatusCode> {
    let records = state
        .repo
        .list()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(records.into_iter().map(VideoSummary::from).collect()))
}

async fn master_playlist(
    State(state): State<AppState>,
    UrlPath(video_id): UrlPath<String>,
) -> Result<Response, StatusCode> {
    let hls_dir = hls_dir_for_video(&state, &video_id).await?;
    serve_media_file(&hls_dir.join(MASTER_PLAYLIST), PLAYLIST_CONTENT_TYPE).await
}

async fn variant_playlist(
    State(state): State<AppState>,
    UrlPath((video_id, resolution)): UrlPath<(String, String)>,
) -> Result<Response, StatusCode> {
    if !is_valid_resolution(&resolution) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let hls_dir = hls_dir_for_video(&state, &video_id).await?;
    serve_media_file(
        &hls_dir.join(resolution).join(VARIANT_PLAYLIST),
        PLAYLIST_CONTENT_TYPE,
    )
    .await
}

async fn hls_segment(
    State(state): State<AppState>,
    UrlPath((video_id, resolution, segment)): UrlPath<(String, String, String)>,
) -> Result<Response, StatusCode> {
    if !is_valid_resolution(&resolution) || !is_valid_segment_name(&segment) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let hls_dir = hls_dir_for_video(&state, &video_id).await?;
    serve_media_file(&hls_dir.join(resolution).join(segment), SEGMENT_CONTENT_TYPE).await
}

async fn hls_dir_for_video(state: &AppState, video_id: &str) -> Result<PathBuf, StatusCode> {
    let record = state
        .repo
        .get(video_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(hls_dir_for(&record.source_path))
}

async fn serve_media_file(
    path: &Path,
    content_type: &'static str,
) -> Result<Response, StatusCode> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &PathBuf, stream: S) -> Result<(), (StatusCode, String)>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    async {
        let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
        let body_reader = StreamReader::new(body_with_io_error);
        futures::pin_mut!(body_reader);

        let mut file = BufWriter::new(File::create(path).await?);
        tokio::io::copy(&mut body_reader, &mut file).await?;

        Ok::<_, io::Error>(())
    }
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

// An uploaded file name must be a single path component: no parent
// references, no separators.
fn file_name_is_valid(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stream_upload_into_videos_dir() {
        let media_root = tempdir().unwrap();
        let upload_dir = media_root.path().join("videos");
        fs::create_dir_all(&upload_dir).unwrap();
        let file_path = upload_dir.join("clip.mp4");

        type E = std::io::Error;

        let chunks = vec![
            Ok::<bytes::Bytes, E>(Bytes::from_static(b"\x00\x00\x00\x18ftypmp42")),
            Ok::<bytes::Bytes, E>(Bytes::from_static(b"mdat....")),
        ];

        let result = stream_to_file(&file_path, stream::iter(chunks)).await;
        assert!(result.is_ok());

        let saved = fs::read(file_path).unwrap();
        assert_eq!(saved, b"\x00\x00\x00\x18ftypmp42mdat....");
    }

    #[tokio::test]
    async fn test_stream_upload_aborted_mid_body() {
        let media_root = tempdir().unwrap();
        let upload_dir = media_root.path().join("videos");
        fs::create_dir_all(&upload_dir).unwrap();
        let file_path = upload_dir.join("clip.mp4");

        let chunks = vec![
            Ok::<bytes::Bytes, &str>(Bytes::from_static(b"\x00\x00\x00\x18ftypmp42")),
            Err("connection reset"),
        ];

        let result = stream_to_file(&file_path, stream::iter(chunks)).await;
        let (status, message) = result.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "connection reset");
    }

    #[test]
    fn test_video_summary_exposes_thumbnail_url() {
        let record = VideoRecord {
            id: String::from("a1b2"),
            title: String::from("clip"),
            source_path: PathBuf::from("/media/videos/clip.mp4"),
            thumbnail_url: Some(String::from("https://cdn.example/media/thumbnail/clip.jpg")),
        };

        let json = serde_json::to_value(VideoSummary::from(record)).unwrap();
        assert_eq!(json["id"], "a1b2");
        assert_eq!(json["title"], "clip");
        assert_eq!(
            json["thumbnail_url"],
            "https://cdn.example/media/thumbnail/clip.jpg"
        );
        assert!(json["source_path"].is_null());
    }

    #[test]
    fn test_valid_file_name() {
        assert!(file_name_is_valid("clip.mp4"));
        assert!(file_name_is_valid("my video.mkv"));
    }

    #[test]
    fn test_invalid_file_name_with_parent() {
        assert!(!file_name_is_valid("../clip.mp4"));
    }

    #[test]
    fn test_invalid_file_name_with_separator() {
        assert!(!file_name_is_valid("dir1/clip.mp4"));
        assert!(!file_name_is_valid(""));
    }
}
