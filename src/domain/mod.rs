//! Domain layer - Pure business logic.

// Typed ffmpeg/ffprobe command construction (no I/O)
pub mod command;

// HLS layout, variant ladder and name validation
pub mod hls;

// Job payloads and the video catalog record
pub mod jobs;
