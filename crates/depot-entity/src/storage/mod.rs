//! Storage accounting domain entities.

pub mod stat;

pub use stat::{StatDelta, StorageStat};
