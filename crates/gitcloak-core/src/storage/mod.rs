//! Storage abstraction for the hosted repository.
//!
//! The encryption layer talks to the outside world only through
//! [`ContentStore`]. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions
//! - [`DirectoryStore`]: a local directory tree standing in for the host

pub mod directory;
pub mod memory;
pub mod traits;
pub mod types;

pub use directory::DirectoryStore;
pub use memory::{Commit, MemoryStore};
pub use traits::ContentStore;
pub use types::{
    content_revision, normalize_dir, normalize_path, sort_entries, EntryKind, FileEntry,
    Revision, StoredFile,
};
