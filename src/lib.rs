//! Martino - HLS Transcode Worker
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (command construction, hls layout, jobs)
//! - ports/: Trait definitions (queue, repository, process runner)
//! - adapters/: Concrete implementations
//! - application/: Services (ingest, transcoder, worker)
//! - config: Environment configuration
//!
//! The transcode job itself is two entry points on
//! [`application::transcoder::Transcoder`]: `convert_to_hls` and
//! `extract_thumbnail`. Everything else exists to dispatch work to them
//! and to serve the files they produce.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use application::transcoder::{MediaConfig, TranscodeError, Transcoder};
pub use config::AppConfig;
pub use domain::jobs::Job;
