//! Share services — link creation, cancellation, and public access.

pub mod access;
pub mod code;
pub mod password;
pub mod service;

pub use access::{ShareAccessService, ShareDownload};
pub use password::SharePasswordHasher;
pub use service::{CreateShareRequest, ShareService};
