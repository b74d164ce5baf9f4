//! Ports layer - trait definitions for external collaborators.

pub mod process;
pub mod queue;
pub mod repository;
