//! FIT activity file decoding.
//!
//! This crate provides:
//! - File header parsing and CRC-16 integrity verification
//! - A streaming decoder that pushes [`ff_common::Record`]s into a
//!   [`ff_common::RecordSink`]
//! - A compact message/field profile for friendly names and units
//!
//! ```ignore
//! use ff_fit::FitDecoder;
//!
//! let decoder = FitDecoder::open("ride.fit")?;
//! decoder.check_integrity()?;
//! let mut records = Vec::new();
//! decoder.run(&mut records)?;
//! ```

pub mod crc;
pub mod decode;
pub mod error;
pub mod header;
pub mod profile;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use decode::{DecodeSummary, FitDecoder};
pub use error::{FitError, Result};
pub use header::FileHeader;
