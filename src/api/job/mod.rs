pub mod models;
pub mod dto;
pub mod service;

// Re-export commonly used types
pub use models::{Column, Job};
pub use service::{SubmitOutcome, SyncController};
