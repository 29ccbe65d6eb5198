//! # depot-service
//!
//! Business logic for the Depot consistency engine: the upload transaction
//! coordinator, content addressing and deduplication, the version chain,
//! soft-delete/recycle, share links, storage accounting, and tenant
//! namespace resolution.
//!
//! PostgreSQL is the single source of truth for existence and ordering;
//! the object store only carries bytes, keyed by content hash within each
//! tenant bucket.

pub mod content;
pub mod context;
pub mod file;
pub mod path;
pub mod share;
pub mod stats;
pub mod tenant;

pub use context::RequestContext;
