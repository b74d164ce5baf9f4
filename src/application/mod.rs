//! Application layer - services wiring the domain to the ports.

pub mod ingest;
pub mod transcoder;
pub mod worker;
