//! File services — upload coordination, versioning, folders, recycle, and
//! downloads.

pub mod download;
pub mod folder;
pub mod recycle;
pub mod upload;
pub mod version;

pub use download::{DownloadResult, DownloadService};
pub use folder::FolderService;
pub use recycle::RecycleService;
pub use upload::{UploadRequest, UploadService};
pub use version::VersionService;
