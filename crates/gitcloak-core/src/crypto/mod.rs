//! Cryptographic operations for GitCloak.
//!
//! Everything here is built on [age](https://age-encryption.org/):
//! - **scrypt** passphrase stanza: memory-hard, salted key derivation
//! - **ChaCha20-Poly1305** STREAM payload with a header MAC
//! - **ASCII armor** so ciphertext can be committed as text
//!
//! ## Threat Model
//!
//! We defend against:
//! - The hosting service (or anyone with read access) reading file contents
//! - Offline brute-force attacks on the passphrase
//! - Undetected tampering with stored ciphertext
//!
//! We do NOT defend against:
//! - Metadata disclosure (paths, sizes, commit times)
//! - Compromised OS / keylogger
//! - Access to an unlocked session's memory

pub mod codec;
pub mod passphrase;

pub use codec::{Codec, EncryptedBlob, DEFAULT_MAX_WORK_FACTOR, DEFAULT_WORK_FACTOR};
pub use passphrase::validate_passphrase;
