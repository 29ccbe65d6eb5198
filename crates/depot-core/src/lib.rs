//! # depot-core
//!
//! Core crate for Depot. Contains collaborator traits, configuration
//! schemas, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Depot crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
