//! Actions that operate on confirmed duplicate sets.
//!
//! Relocation is the only action: files move into a quarantine directory
//! and are never deleted.

pub mod relocate;

pub use relocate::{
    quarantine_dir_name, RelocateConfig, RelocateError, RelocateOutcome, RelocationRecord,
    Relocator, QUARANTINE_PREFIX, RELOCATION_LOG_NAME,
};
