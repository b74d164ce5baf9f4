//! Adapters layer - concrete implementations of the ports.

pub mod process;
pub mod queue;
pub mod repository;
