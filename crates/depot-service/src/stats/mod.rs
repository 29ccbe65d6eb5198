//! Storage accounting services.

pub mod accounting;

pub use accounting::AccountingService;
