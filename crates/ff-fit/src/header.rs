//! FIT file header.
//!
//! Layout (all multi-byte values little-endian):
//!
//! | offset | size | content                          |
//! |--------|------|----------------------------------|
//! | 0      | 1    | header size (12 or 14)           |
//! | 1      | 1    | protocol version                 |
//! | 2      | 2    | profile version                  |
//! | 4      | 4    | data size, excluding header/CRC  |
//! | 8      | 4    | `.FIT`                           |
//! | 12     | 2    | header CRC, 0 when not computed  |

use crate::crc;
use crate::error::{FitError, Result};

/// Data type signature at bytes 8..12.
pub const SIGNATURE: &[u8; 4] = b".FIT";

/// Header size without the optional CRC.
pub const LEGACY_HEADER_SIZE: usize = 12;

/// Header size with the CRC.
pub const HEADER_SIZE: usize = 14;

/// Size of the trailing file CRC.
pub const FILE_CRC_SIZE: usize = 2;

/// Parsed FIT file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    pub data_size: u32,
    /// Stored header CRC, if the header carries one.
    pub crc: Option<u16>,
}

impl FileHeader {
    /// Parse the header at the start of `bytes`.
    ///
    /// `offset` is the position of `bytes` within the file and only used
    /// for error messages.
    pub fn parse(bytes: &[u8], offset: usize) -> Result<Self> {
        let header_size = *bytes.first().ok_or(FitError::Truncated {
            offset,
            needed: LEGACY_HEADER_SIZE,
        })? as usize;

        if header_size < LEGACY_HEADER_SIZE {
            return Err(FitError::InvalidHeader {
                offset,
                reason: format!("header size {header_size} is below {LEGACY_HEADER_SIZE}"),
            });
        }
        if bytes.len() < header_size {
            return Err(FitError::Truncated {
                offset,
                needed: header_size - bytes.len(),
            });
        }
        if &bytes[8..12] != SIGNATURE {
            return Err(FitError::InvalidHeader {
                offset,
                reason: "missing .FIT signature".to_string(),
            });
        }

        let crc = if header_size >= HEADER_SIZE {
            Some(u16::from_le_bytes([bytes[12], bytes[13]]))
        } else {
            None
        };

        Ok(FileHeader {
            header_size: header_size as u8,
            protocol_version: bytes[1],
            profile_version: u16::from_le_bytes([bytes[2], bytes[3]]),
            data_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            crc,
        })
    }

    /// Verify the header CRC against the first 12 header bytes.
    ///
    /// A stored CRC of zero means the writer did not compute one.
    pub fn verify_crc(&self, bytes: &[u8], offset: usize) -> Result<()> {
        match self.crc {
            Some(stored) if stored != 0 => {
                let computed = crc::checksum(&bytes[..LEGACY_HEADER_SIZE]);
                if computed != stored {
                    return Err(FitError::HeaderCrcMismatch {
                        offset,
                        stored,
                        computed,
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Total bytes the segment occupies: header, data, and file CRC.
    pub fn segment_len(&self) -> usize {
        self.header_size as usize + self.data_size as usize + FILE_CRC_SIZE
    }

    /// Byte range of the data records, relative to the segment start.
    pub fn data_range(&self) -> std::ops::Range<usize> {
        let start = self.header_size as usize;
        start..start + self.data_size as usize
    }

    /// Encode a 14-byte header with a computed CRC.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0] = HEADER_SIZE as u8;
        out[1] = self.protocol_version;
        out[2..4].copy_from_slice(&self.profile_version.to_le_bytes());
        out[4..8].copy_from_slice(&self.data_size.to_le_bytes());
        out[8..12].copy_from_slice(SIGNATURE);
        let crc = crc::checksum(&out[..LEGACY_HEADER_SIZE]);
        out[12..14].copy_from_slice(&crc.to_le_bytes());
        out
    }
}
