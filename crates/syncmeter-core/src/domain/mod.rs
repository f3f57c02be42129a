//! Domain entities consumed by the progress engine
//!
//! - Newtypes for validated path keys and run identifiers
//! - `SyncFileItem`, the read-only description of one changed entry
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod sync_file_item;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::{ItemPath, RunId};
pub use sync_file_item::{Direction, Instruction, ItemStatus, SyncFileItem};
