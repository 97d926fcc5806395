//! # GitCloak Core
//!
//! Password-protected encryption for files kept in a hosted repository.
//!
//! This crate provides the encryption subsystem independent of any user
//! interface: the host supplies passphrases through a prompt trait and a
//! content store through a storage trait.
//!
//! ## Architecture
//!
//! - **crypto**: age/scrypt codec producing armored text envelopes
//! - **artifact**: the per-repository `.gitcloak` verification document
//! - **cache**: in-memory passphrases keyed by [`Scope`]
//! - **protocol**: the `NoArtifact` / `Locked` / `Unlocked` state logic
//! - **session**: save/load orchestration over a [`ContentStore`]
//! - **storage**: store trait plus in-memory and directory backends

pub mod artifact;
pub mod cache;
pub mod crypto;
pub mod error;
mod fs;
pub mod listing;
pub mod prompt;
pub mod protocol;
pub mod scope;
pub mod session;
pub mod storage;

pub use artifact::{verify_document, VerificationArtifact, ARTIFACT_PATH};
pub use cache::PasswordCache;
pub use crypto::{Codec, EncryptedBlob};
pub use error::{CloakError, Result};
pub use listing::Listing;
pub use prompt::{NewPassphrase, PassphrasePrompt, PromptPurpose, StaticPrompt};
pub use protocol::ScopeState;
pub use scope::Scope;
pub use session::{LoadedFile, SavedFile, Session, ENCRYPTED_SUFFIX};
pub use storage::{ContentStore, DirectoryStore, MemoryStore, Revision};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
