//! File domain entities.

pub mod model;
pub mod version;

pub use model::{CreateFile, DeletionState, File};
pub use version::{CreateVersion, FileVersion};
