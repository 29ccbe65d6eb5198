//! Repository implementations for all Depot entities.

pub mod file;
pub mod project;
pub mod share;
pub mod stat;

pub use file::FileRepository;
pub use project::ProjectRepository;
pub use share::ShareRepository;
pub use stat::StatRepository;
