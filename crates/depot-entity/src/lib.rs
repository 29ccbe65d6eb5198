//! # depot-entity
//!
//! Domain entity models for Depot. Every struct in this crate represents a
//! database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally implement `sqlx::FromRow`.

pub mod file;
pub mod project;
pub mod share;
pub mod storage;
