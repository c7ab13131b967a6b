//! quotegrab common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and utilities for the quotegrab workspace:
//!
//! - **Fingerprints**: the fixed-width content digest used for deduplication
//! - **Error Handling**: the shared error type and result alias
//! - **Logging**: `tracing` subscriber setup
//!
//! # Example
//!
//! ```
//! use quotegrab_common::fingerprint::{Fingerprint, FINGERPRINT_LEN};
//!
//! let fp = Fingerprint::of("Hello, world!");
//! assert_eq!(fp.as_bytes().len(), FINGERPRINT_LEN);
//! assert_eq!(fp, Fingerprint::of("Hello, world!"));
//! ```

pub mod error;
pub mod fingerprint;
pub mod logging;

// Re-export commonly used types
pub use error::{GrabError, Result};
pub use fingerprint::{Fingerprint, FINGERPRINT_LEN};
