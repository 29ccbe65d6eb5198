//! Collaborator traits consumed by the engine.

pub mod authorization;
pub mod object_store;

pub use authorization::{Action, Authorizer, OpenAuthorizer};
pub use object_store::{ByteStream, ObjectStore};
