//! FIT file builder for tests.
//!
//! Produces well-formed single-segment files: a 14-byte header with CRC,
//! the messages in call order, and the trailing file CRC.
//!
//! ```ignore
//! let mut builder = FitFileBuilder::new();
//! builder
//!     .define(0, 20, &[(3, 1, BaseType::Uint8)])
//!     .data(0, &[60])
//!     .data(0, &[62]);
//! std::fs::write("ride.fit", builder.finish())?;
//! ```

use std::path::Path;

use ff_common::BaseType;

use crate::crc;
use crate::header::FileHeader;

/// Protocol version 2.0 as written in the header.
const PROTOCOL_VERSION: u8 = 0x20;
const PROFILE_VERSION: u16 = 2132;

#[derive(Debug, Clone, Default)]
pub struct FitFileBuilder {
    data: Vec<u8>,
    big_endian: bool,
}

impl FitFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte order used by subsequent definitions.
    pub fn big_endian(&mut self, big_endian: bool) -> &mut Self {
        self.big_endian = big_endian;
        self
    }

    /// Definition message binding `local_type` to `global_num`.
    ///
    /// Each field is `(field_num, size_in_bytes, base_type)`.
    pub fn define(
        &mut self,
        local_type: u8,
        global_num: u16,
        fields: &[(u8, u8, BaseType)],
    ) -> &mut Self {
        self.define_inner(local_type, global_num, fields, None)
    }

    /// Definition message with developer fields `(field_num, size, developer_index)`.
    pub fn define_with_developer(
        &mut self,
        local_type: u8,
        global_num: u16,
        fields: &[(u8, u8, BaseType)],
        developer_fields: &[(u8, u8, u8)],
    ) -> &mut Self {
        self.define_inner(local_type, global_num, fields, Some(developer_fields))
    }

    fn define_inner(
        &mut self,
        local_type: u8,
        global_num: u16,
        fields: &[(u8, u8, BaseType)],
        developer_fields: Option<&[(u8, u8, u8)]>,
    ) -> &mut Self {
        let mut header = 0x40 | (local_type & 0x0F);
        if developer_fields.is_some() {
            header |= 0x20;
        }
        self.data.push(header);
        self.data.push(0);
        self.data.push(u8::from(self.big_endian));
        if self.big_endian {
            self.data.extend_from_slice(&global_num.to_be_bytes());
        } else {
            self.data.extend_from_slice(&global_num.to_le_bytes());
        }
        self.data.push(fields.len() as u8);
        for (num, size, base_type) in fields {
            self.data.extend_from_slice(&[*num, *size, base_type.to_byte()]);
        }
        if let Some(dev) = developer_fields {
            self.data.push(dev.len() as u8);
            for (num, size, index) in dev {
                self.data.extend_from_slice(&[*num, *size, *index]);
            }
        }
        self
    }

    /// Data message with a normal header; `payload` is the packed field
    /// bytes in definition order.
    pub fn data(&mut self, local_type: u8, payload: &[u8]) -> &mut Self {
        self.data.push(local_type & 0x0F);
        self.data.extend_from_slice(payload);
        self
    }

    /// Data message with a compressed timestamp header.
    pub fn compressed(&mut self, local_type: u8, time_offset: u8, payload: &[u8]) -> &mut Self {
        self.data
            .push(0x80 | ((local_type & 0x03) << 5) | (time_offset & 0x1F));
        self.data.extend_from_slice(payload);
        self
    }

    /// Append bytes verbatim.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Encode the complete file.
    pub fn finish(&self) -> Vec<u8> {
        let header = FileHeader {
            header_size: crate::header::HEADER_SIZE as u8,
            protocol_version: PROTOCOL_VERSION,
            profile_version: PROFILE_VERSION,
            data_size: self.data.len() as u32,
            crc: None,
        };

        let mut out = header.encode().to_vec();
        out.extend_from_slice(&self.data);
        let file_crc = crc::checksum(&out);
        out.extend_from_slice(&file_crc.to_le_bytes());
        out
    }

    /// Encode and write to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.finish())
    }
}
