//! Passphrase codec: plaintext bytes to armored age text and back.
//!
//! The envelope is a standard age v1 file with a single scrypt stanza,
//! ASCII-armored so it can be stored as text. age generates a fresh salt
//! and file key per call, so two encodings of the same input never match.
//!
//! The scrypt work factor is fixed by the [`Codec`] value rather than
//! calibrated to the current machine, so every client of a deployment
//! produces (and accepts) the same cost.

use std::io::{Read, Write};
use std::iter;

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::secrecy::{ExposeSecret, SecretString};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{CloakError, Result};

/// Default scrypt work factor (log2 N) used when encrypting.
pub const DEFAULT_WORK_FACTOR: u8 = 18;

/// Default upper bound on the work factor accepted when decrypting.
pub const DEFAULT_MAX_WORK_FACTOR: u8 = 22;

/// Hard ceiling on either work factor; beyond this scrypt needs >128 GiB.
const WORK_FACTOR_CEILING: u8 = 30;

const ARMOR_BEGIN: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

/// Armored age ciphertext, safe to store as text.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    /// The armored text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for EncryptedBlob {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Encoder/decoder bound to fixed scrypt parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    work_factor: u8,
    max_work_factor: u8,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            max_work_factor: DEFAULT_MAX_WORK_FACTOR,
        }
    }
}

impl Codec {
    /// Create a codec that encrypts at `work_factor` and refuses to decrypt
    /// anything demanding more than `max_work_factor`.
    ///
    /// # Errors
    ///
    /// Returns `CloakError::InvalidInput` if either factor is zero, above
    /// the supported ceiling, or if the maximum is below the encryption
    /// factor (the codec could not read its own output).
    pub fn new(work_factor: u8, max_work_factor: u8) -> Result<Self> {
        if work_factor == 0 || work_factor > WORK_FACTOR_CEILING {
            return Err(CloakError::InvalidInput(format!(
                "Work factor must be between 1 and {} (got {})",
                WORK_FACTOR_CEILING, work_factor
            )));
        }
        if max_work_factor < work_factor || max_work_factor > WORK_FACTOR_CEILING {
            return Err(CloakError::InvalidInput(format!(
                "Maximum work factor must be between {} and {} (got {})",
                work_factor, WORK_FACTOR_CEILING, max_work_factor
            )));
        }
        Ok(Self {
            work_factor,
            max_work_factor,
        })
    }

    pub fn work_factor(&self) -> u8 {
        self.work_factor
    }

    pub fn max_work_factor(&self) -> u8 {
        self.max_work_factor
    }

    /// Encrypt `plaintext` under `passphrase`.
    ///
    /// # Errors
    ///
    /// Returns `CloakError::InvalidInput` for an empty passphrase and
    /// `CloakError::Crypto` if the age stream cannot be produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use age::secrecy::SecretString;
    /// use gitcloak_core::crypto::Codec;
    ///
    /// let codec = Codec::new(10, 10).unwrap();
    /// let passphrase = SecretString::from("correct-horse".to_string());
    /// let blob = codec.encode(b"hello", &passphrase).unwrap();
    /// assert_eq!(codec.decode(&blob, &passphrase).unwrap(), b"hello");
    /// ```
    pub fn encode(&self, plaintext: &[u8], passphrase: &SecretString) -> Result<EncryptedBlob> {
        if passphrase.expose_secret().is_empty() {
            return Err(CloakError::InvalidInput(
                "Passphrase cannot be empty".to_string(),
            ));
        }

        let mut recipient = age::scrypt::Recipient::new(duplicate_secret(passphrase));
        recipient.set_work_factor(self.work_factor);
        let encryptor =
            age::Encryptor::with_recipients(iter::once(&recipient as &dyn age::Recipient))
                .map_err(|e| CloakError::Crypto(format!("Failed to create encryptor: {}", e)))?;

        let mut armored = Vec::new();
        let armor = ArmoredWriter::wrap_output(&mut armored, Format::AsciiArmor)
            .map_err(|e| CloakError::Crypto(format!("Failed to create armor: {}", e)))?;
        let mut writer = encryptor
            .wrap_output(armor)
            .map_err(|e| CloakError::Crypto(format!("Failed to create encryptor: {}", e)))?;

        writer
            .write_all(plaintext)
            .map_err(|e| CloakError::Crypto(format!("Encryption write failed: {}", e)))?;

        writer
            .finish()
            .and_then(|armor| armor.finish())
            .map_err(|e| CloakError::Crypto(format!("Encryption finish failed: {}", e)))?;

        let text = String::from_utf8(armored)
            .map_err(|_| CloakError::Crypto("Armor produced non-ASCII output".to_string()))?;
        Ok(EncryptedBlob(text))
    }

    /// Decrypt `blob` with `passphrase`.
    ///
    /// Fails closed: no plaintext is returned unless every payload chunk
    /// authenticates, and chunks decrypted before a failing one are wiped.
    ///
    /// # Errors
    ///
    /// - `CloakError::MalformedEnvelope` if the text is not an armored age
    ///   file, or it demands more work than this codec accepts
    /// - `CloakError::AuthenticationFailure` if the passphrase is wrong or
    ///   the ciphertext was modified
    pub fn decode(&self, blob: &EncryptedBlob, passphrase: &SecretString) -> Result<Vec<u8>> {
        let text = blob.as_str().trim_start();
        if !text.starts_with(ARMOR_BEGIN) {
            return Err(CloakError::MalformedEnvelope(
                "missing age armor header".to_string(),
            ));
        }

        let decryptor =
            age::Decryptor::new(ArmoredReader::new(text.as_bytes())).map_err(classify)?;

        let mut identity = age::scrypt::Identity::new(duplicate_secret(passphrase));
        identity.set_max_work_factor(self.max_work_factor);
        let mut reader = decryptor
            .decrypt(iter::once(&identity as &dyn age::Identity))
            .map_err(classify)?;

        let mut plaintext = Vec::new();
        if reader.read_to_end(&mut plaintext).is_err() {
            // Chunks before the failing one were already decrypted into the buffer.
            plaintext.zeroize();
            return Err(CloakError::AuthenticationFailure);
        }
        Ok(plaintext)
    }

    /// [`Codec::encode`] on the blocking pool, yielding to the runtime
    /// immediately before and after the key derivation.
    pub async fn encode_in_background(
        self,
        plaintext: Zeroizing<Vec<u8>>,
        passphrase: SecretString,
    ) -> Result<EncryptedBlob> {
        tokio::task::yield_now().await;
        let result = tokio::task::spawn_blocking(move || self.encode(&plaintext, &passphrase))
            .await
            .map_err(|e| CloakError::Crypto(format!("Codec task failed: {}", e)))?;
        tokio::task::yield_now().await;
        result
    }

    /// [`Codec::decode`] on the blocking pool, yielding to the runtime
    /// immediately before and after the key derivation.
    pub async fn decode_in_background(
        self,
        blob: EncryptedBlob,
        passphrase: SecretString,
    ) -> Result<Vec<u8>> {
        tokio::task::yield_now().await;
        let result = tokio::task::spawn_blocking(move || self.decode(&blob, &passphrase))
            .await
            .map_err(|e| CloakError::Crypto(format!("Codec task failed: {}", e)))?;
        tokio::task::yield_now().await;
        result
    }
}

/// Copy a secret without exposing it beyond this call.
pub(crate) fn duplicate_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

fn classify(err: age::DecryptError) -> CloakError {
    match err {
        age::DecryptError::DecryptionFailed
        | age::DecryptError::KeyDecryptionFailed
        | age::DecryptError::NoMatchingKeys
        | age::DecryptError::InvalidMac => CloakError::AuthenticationFailure,
        age::DecryptError::ExcessiveWork { required, .. } => CloakError::MalformedEnvelope(
            format!("work factor {} exceeds the accepted maximum", required),
        ),
        age::DecryptError::InvalidHeader | age::DecryptError::UnknownFormat => {
            CloakError::MalformedEnvelope("invalid age header".to_string())
        }
        age::DecryptError::Io(e) => {
            CloakError::MalformedEnvelope(format!("unreadable envelope: {}", e))
        }
        other => CloakError::Crypto(format!("Decryption failed: {}", other)),
    }
}
