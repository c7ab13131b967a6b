//! Content fingerprints for deduplication
//!
//! A fingerprint is the 16-byte MD5 digest of a text item's UTF-8 bytes. The
//! on-disk fingerprint log is a raw concatenation of these digests, so the
//! width here is also the record width of that file.

use std::fmt;

/// Width of one fingerprint, and of one fingerprint log record, in bytes.
pub const FINGERPRINT_LEN: usize = 16;

/// Fixed-width content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Compute the fingerprint of a text item
    pub fn of(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Compute the fingerprint of raw bytes
    pub fn of_bytes(data: &[u8]) -> Self {
        Fingerprint(md5::compute(data).0)
    }

    /// Build a fingerprint from one log record.
    ///
    /// Returns `None` unless `record` is exactly [`FINGERPRINT_LEN`] bytes.
    pub fn from_record(record: &[u8]) -> Option<Self> {
        let bytes: [u8; FINGERPRINT_LEN] = record.try_into().ok()?;
        Some(Fingerprint(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
