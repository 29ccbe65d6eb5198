//! # depot-storage
//!
//! Object-store provider implementations for Depot (local filesystem and
//! S3-compatible services) and the deterministic tenant bucket mapper.

pub mod bucket;
pub mod providers;
