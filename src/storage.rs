//! Registry backends.
//!
//! Both backends implement [`AssetRegistry`](crate::AssetRegistry). The
//! [`Directory`] additionally supports writes.

mod directory;
pub use directory::{
    AuditIssue, AuditReport, Directory, ExhaustedError, InitError, NewAsset, RegisterError,
    Transfer, TransferError,
};

/// JSON envelope codec shared with the web backend.
pub mod envelope;

mod memory;
pub use memory::MemoryRegistry;
