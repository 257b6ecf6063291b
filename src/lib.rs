#![forbid(unsafe_code)]
//! # qrpage
//!
//! A single-page web utility that turns a URL into a downloadable QR code
//! PNG. The crate splits into a pure encoding core and a thin hosting shell:
//!
//! - [`symbol`]: QR Code Model 2 symbol encoding (versions 1 to 40, four
//!   error correction levels, numeric/alphanumeric/byte data modes).
//! - [`encoder`]: the fixed-configuration pipeline from payload text to
//!   PNG bytes (version-1 fit mode, Low error correction, 10 pixels per
//!   module, 4-module quiet zone, black on white).
//! - [`server`]: the axum page serving the form, the inline preview, and
//!   the `qrcode.png` download.
//!
//! The encoding path is deterministic: the same payload always produces
//! byte-identical PNG output.
//!
//! ## Example
//!
//! Encode a URL to an in-memory PNG buffer:
//!
//! ```rust
//! use qrpage::encoder;
//!
//! let png = encoder::encode("https://example.com").unwrap();
//! assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
//! ```
//!
//! Or work with the symbol grid directly:
//!
//! ```rust
//! use qrpage::symbol::{Symbol, Ecc, Version};
//!
//! let qr = Symbol::encode_text(
//!     "Hello, World!",
//!     Ecc::Low,
//!     Version::MIN,
//!     Version::MAX,
//!     None,
//!     false,
//! ).unwrap();
//! assert_eq!(qr.size(), 21);
//! ```

pub mod encoder;
pub mod error;
pub mod server;
pub mod symbol;

pub use error::EncodeError;
