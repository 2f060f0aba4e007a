//! Streaming FIT decoder.
//!
//! A FIT file is one or more chained segments, each a header, a run of
//! definition and data messages, and a file CRC. Definition messages bind a
//! local message type (0-15) to a global message number and a field layout;
//! data messages reference the local type and carry the packed values.
//!
//! ```text
//! record header ──► bit 7 set   → compressed timestamp data message (local 0-3)
//!                   bit 6 set   → definition message (bit 5: developer fields)
//!                   otherwise   → data message
//! ```

use std::path::{Path, PathBuf};

use ff_common::{BaseType, Field, RawValue, Record, RecordSink};
use tracing::{debug, trace};

use crate::crc;
use crate::error::{FitError, Result};
use crate::header::FileHeader;
use crate::profile::{self, TIMESTAMP_FIELD};

const LOCAL_TYPES: usize = 16;

/// Counters reported after a full decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub segments: usize,
    pub definitions: u64,
    pub records: u64,
}

/// FIT decoder over an in-memory file image.
#[derive(Debug, Clone)]
pub struct FitDecoder {
    bytes: Vec<u8>,
    source: Option<PathBuf>,
}

impl FitDecoder {
    /// Read a FIT file into memory.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "opened FIT file");
        Ok(Self {
            bytes,
            source: Some(path.to_path_buf()),
        })
    }

    /// Decode from bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            source: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Verify every chained segment: header, header CRC, size, file CRC.
    ///
    /// Returns the segment headers in file order.
    pub fn check_integrity(&self) -> Result<Vec<FileHeader>> {
        if self.bytes.is_empty() {
            return Err(FitError::Empty);
        }

        let mut headers = Vec::new();
        let mut offset = 0;
        while offset < self.bytes.len() {
            let segment = &self.bytes[offset..];
            let header = FileHeader::parse(segment, offset)?;
            header.verify_crc(segment, offset)?;

            let len = header.segment_len();
            if segment.len() < len {
                return Err(FitError::Truncated {
                    offset: offset + segment.len(),
                    needed: len - segment.len(),
                });
            }

            let residue = crc::checksum(&segment[..len]);
            if residue != 0 {
                return Err(FitError::FileCrcMismatch { offset, residue });
            }

            trace!(offset, data_size = header.data_size, "segment verified");
            headers.push(header);
            offset += len;
        }

        debug!(segments = headers.len(), "integrity check passed");
        Ok(headers)
    }

    /// Decode every segment, pushing each data message into `sink`.
    ///
    /// Stops at the first malformed message. Records already delivered to
    /// the sink stay delivered; callers that need all-or-nothing semantics
    /// discard the sink on error.
    pub fn run<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<DecodeSummary> {
        let mut summary = DecodeSummary::default();
        let mut offset = 0;

        while offset < self.bytes.len() {
            let segment = &self.bytes[offset..];
            let header = FileHeader::parse(segment, offset)?;
            let range = header.data_range();
            if segment.len() < range.end {
                return Err(FitError::Truncated {
                    offset: offset + segment.len(),
                    needed: range.end - segment.len(),
                });
            }

            let mut decoder = SegmentDecoder::new(&segment[range.clone()], offset + range.start);
            decoder.decode_all(sink)?;

            summary.segments += 1;
            summary.definitions += decoder.definitions_seen;
            summary.records += decoder.records_emitted;
            offset += header.segment_len().min(segment.len());
        }

        debug!(
            segments = summary.segments,
            definitions = summary.definitions,
            records = summary.records,
            "decode finished"
        );
        Ok(summary)
    }
}

#[derive(Debug, Clone)]
struct FieldDef {
    num: u8,
    size: u8,
    base_type: BaseType,
}

#[derive(Debug, Clone)]
struct Definition {
    global_num: u16,
    big_endian: bool,
    fields: Vec<FieldDef>,
    developer_size: usize,
}

impl Definition {
    fn message_size(&self) -> usize {
        self.fields.iter().map(|f| f.size as usize).sum::<usize>() + self.developer_size
    }
}

/// Decoder state for one segment; definitions do not cross segments.
struct SegmentDecoder<'a> {
    data: &'a [u8],
    base: usize,
    pos: usize,
    definitions: [Option<Definition>; LOCAL_TYPES],
    last_timestamp: Option<u32>,
    definitions_seen: u64,
    records_emitted: u64,
}

impl<'a> SegmentDecoder<'a> {
    fn new(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            base,
            pos: 0,
            definitions: std::array::from_fn(|_| None),
            last_timestamp: None,
            definitions_seen: 0,
            records_emitted: 0,
        }
    }

    fn decode_all<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        while self.pos < self.data.len() {
            self.decode_message(sink)?;
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(FitError::Truncated {
                offset: self.base + self.pos,
                needed: end - self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn decode_message<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let offset = self.base + self.pos;
        let header = self.take(1)?[0];

        if header & 0x80 != 0 {
            let local_type = (header >> 5) & 0x03;
            let timestamp = self.advance_timestamp((header & 0x1F) as u32);
            self.decode_data(local_type, Some(timestamp), offset, sink)
        } else if header & 0x40 != 0 {
            self.decode_definition(header & 0x0F, header & 0x20 != 0)
        } else {
            self.decode_data(header & 0x0F, None, offset, sink)
        }
    }

    /// Rebuild a full timestamp from a 5-bit offset, rolling over when the
    /// offset is below the low bits of the previous timestamp.
    fn advance_timestamp(&mut self, time_offset: u32) -> u32 {
        let last = self.last_timestamp.unwrap_or(0);
        let mut timestamp = (last & !0x1F).wrapping_add(time_offset);
        if time_offset < (last & 0x1F) {
            timestamp = timestamp.wrapping_add(0x20);
        }
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    fn decode_definition(&mut self, local_type: u8, has_developer_fields: bool) -> Result<()> {
        let fixed = self.take(5)?;
        let big_endian = fixed[1] != 0;
        let global_num = if big_endian {
            u16::from_be_bytes([fixed[2], fixed[3]])
        } else {
            u16::from_le_bytes([fixed[2], fixed[3]])
        };
        let num_fields = fixed[4] as usize;

        let fields = self
            .take(num_fields * 3)?
            .chunks_exact(3)
            .map(|c| FieldDef {
                num: c[0],
                size: c[1],
                base_type: BaseType::from_byte(c[2]),
            })
            .collect();

        let mut developer_size = 0;
        if has_developer_fields {
            let count = self.take(1)?[0] as usize;
            developer_size = self
                .take(count * 3)?
                .chunks_exact(3)
                .map(|c| c[1] as usize)
                .sum();
        }

        trace!(
            local_type,
            global_num,
            num_fields,
            developer_size,
            big_endian,
            "definition message"
        );
        self.definitions[local_type as usize] = Some(Definition {
            global_num,
            big_endian,
            fields,
            developer_size,
        });
        self.definitions_seen += 1;
        Ok(())
    }

    fn decode_data<S: RecordSink + ?Sized>(
        &mut self,
        local_type: u8,
        compressed_timestamp: Option<u32>,
        offset: usize,
        sink: &mut S,
    ) -> Result<()> {
        let size = self.definitions[local_type as usize]
            .as_ref()
            .map(Definition::message_size)
            .ok_or(FitError::UndefinedLocalType { offset, local_type })?;
        let body = self.take(size)?;

        let Some(definition) = self.definitions[local_type as usize].as_ref() else {
            return Err(FitError::UndefinedLocalType { offset, local_type });
        };

        let global_num = definition.global_num;
        let mut record = Record::new(global_num, profile::message_name(global_num));
        let mut full_timestamp = None;
        let mut cursor = 0;

        for def in &definition.fields {
            let raw = &body[cursor..cursor + def.size as usize];
            cursor += def.size as usize;

            let field = decode_field(global_num, def, raw, definition.big_endian);
            if def.num == TIMESTAMP_FIELD {
                if let Some(RawValue::Unsigned(ts)) = field.values.first() {
                    if *ts != u32::MAX as u64 {
                        full_timestamp = Some(*ts as u32);
                    }
                }
            }
            record.fields.push(field);
        }

        if let Some(ts) = full_timestamp {
            self.last_timestamp = Some(ts);
        } else if let Some(ts) = compressed_timestamp {
            let (name, units) = profile::field_info(global_num, TIMESTAMP_FIELD);
            record.fields.push(Field::new(
                name,
                units,
                BaseType::Uint32,
                RawValue::Unsigned(ts as u64),
            ));
        }

        sink.ingest(&record);
        self.records_emitted += 1;
        Ok(())
    }
}

fn decode_field(global_num: u16, def: &FieldDef, raw: &[u8], big_endian: bool) -> Field {
    let (name, units) = profile::field_info(global_num, def.num);
    let kind = def.base_type;

    let values = match kind {
        BaseType::String => vec![RawValue::Text(decode_string(raw))],
        BaseType::Unknown(_) => vec![RawValue::Opaque(raw.to_vec())],
        _ => {
            let width = kind.size().unwrap_or(1);
            if raw.len() % width != 0 {
                debug!(
                    field = %name,
                    size = raw.len(),
                    width,
                    "field size is not a multiple of its base type"
                );
                vec![RawValue::Opaque(raw.to_vec())]
            } else {
                raw.chunks_exact(width)
                    .map(|chunk| read_scalar(kind, chunk, big_endian))
                    .collect()
            }
        }
    };

    Field::multi(name, units, kind, values)
}

fn decode_string(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Copy `N` bytes into little-endian order.
fn ordered<const N: usize>(bytes: &[u8], big_endian: bool) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    if big_endian {
        out.reverse();
    }
    out
}

fn read_scalar(kind: BaseType, bytes: &[u8], big_endian: bool) -> RawValue {
    match kind {
        BaseType::Enum | BaseType::Uint8 | BaseType::Uint8z | BaseType::Byte => {
            RawValue::Unsigned(bytes[0] as u64)
        }
        BaseType::Sint8 => RawValue::Signed(bytes[0] as i8 as i64),
        BaseType::Sint16 => RawValue::Signed(i16::from_le_bytes(ordered(bytes, big_endian)) as i64),
        BaseType::Uint16 | BaseType::Uint16z => {
            RawValue::Unsigned(u16::from_le_bytes(ordered(bytes, big_endian)) as u64)
        }
        BaseType::Sint32 => RawValue::Signed(i32::from_le_bytes(ordered(bytes, big_endian)) as i64),
        BaseType::Uint32 | BaseType::Uint32z => {
            RawValue::Unsigned(u32::from_le_bytes(ordered(bytes, big_endian)) as u64)
        }
        BaseType::Float32 => {
            RawValue::Float(f32::from_le_bytes(ordered(bytes, big_endian)) as f64)
        }
        BaseType::Float64 => RawValue::Float(f64::from_le_bytes(ordered(bytes, big_endian))),
        BaseType::Sint64 => RawValue::Signed(i64::from_le_bytes(ordered(bytes, big_endian))),
        BaseType::Uint64 | BaseType::Uint64z => {
            RawValue::Unsigned(u64::from_le_bytes(ordered(bytes, big_endian)))
        }
        BaseType::String | BaseType::Unknown(_) => RawValue::Opaque(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FitFileBuilder;

    const RECORD: u16 = 20;

    fn decode(bytes: Vec<u8>) -> Result<Vec<Record>> {
        let decoder = FitDecoder::from_bytes(bytes);
        let mut records = Vec::new();
        decoder.run(&mut records)?;
        Ok(records)
    }

    #[test]
    fn decodes_definition_and_data() {
        let mut builder = FitFileBuilder::new();
        builder
            .define(0, RECORD, &[(3, 1, BaseType::Uint8), (4, 1, BaseType::Uint8)])
            .data(0, &[60, 80]);
        let bytes = builder.finish();

        let decoder = FitDecoder::from_bytes(bytes);
        assert_eq!(decoder.check_integrity().unwrap().len(), 1);

        let mut records = Vec::new();
        let summary = decoder.run(&mut records).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.definitions, 1);

        let record = &records[0];
        assert_eq!(record.type_id, RECORD);
        assert_eq!(record.type_name, "record");
        assert_eq!(record.fields[0].name, "heart_rate");
        assert_eq!(record.fields[0].units, "bpm");
        assert_eq!(record.fields[0].value_as_f64(0), Some(60.0));
        assert_eq!(record.fields[1].name, "cadence");
        assert_eq!(record.fields[1].value_as_f64(0), Some(80.0));
    }

    #[test]
    fn multi_valued_fields_split_by_base_type_width() {
        let mut builder = FitFileBuilder::new();
        let payload: Vec<u8> = [10u16, 20, 30].iter().flat_map(|v| v.to_le_bytes()).collect();
        builder
            .define(0, RECORD, &[(200, 6, BaseType::Uint16)])
            .data(0, &payload);

        let records = decode(builder.finish()).unwrap();
        let field = &records[0].fields[0];
        assert_eq!(field.name, "field_200");
        assert_eq!(field.num_values(), 3);
        assert_eq!(field.value_as_f64(2), Some(30.0));
    }

    #[test]
    fn big_endian_definitions_are_honoured() {
        let mut builder = FitFileBuilder::new();
        builder
            .big_endian(true)
            .define(0, RECORD, &[(2, 2, BaseType::Uint16), (0, 4, BaseType::Sint32)]);
        let mut payload = 1234u16.to_be_bytes().to_vec();
        payload.extend_from_slice(&(-500i32).to_be_bytes());
        builder.data(0, &payload);

        let records = decode(builder.finish()).unwrap();
        assert_eq!(records[0].type_id, RECORD);
        assert_eq!(records[0].fields[0].value_as_f64(0), Some(1234.0));
        assert_eq!(records[0].fields[1].value_as_f64(0), Some(-500.0));
    }

    #[test]
    fn strings_stop_at_nul() {
        let mut builder = FitFileBuilder::new();
        builder
            .define(0, 12, &[(3, 8, BaseType::String)])
            .data(0, b"ride\0\0\0\0");

        let records = decode(builder.finish()).unwrap();
        assert_eq!(records[0].type_name, "sport");
        assert_eq!(records[0].fields[0].values, vec![RawValue::Text("ride".into())]);
        assert_eq!(records[0].fields[0].value_as_f64(0), None);
    }

    #[test]
    fn compressed_timestamps_roll_over() {
        let mut builder = FitFileBuilder::new();
        builder
            .define(0, RECORD, &[(253, 4, BaseType::Uint32), (3, 1, BaseType::Uint8)])
            .define(1, RECORD, &[(3, 1, BaseType::Uint8)]);
        // Low five bits of 1_000_030 are 30.
        let mut payload = 1_000_030u32.to_le_bytes().to_vec();
        payload.push(100);
        builder.data(0, &payload).compressed(1, 31, &[101]).compressed(1, 2, &[102]);

        let records = decode(builder.finish()).unwrap();
        assert_eq!(records.len(), 3);

        let ts = |r: &Record| {
            r.fields
                .iter()
                .find(|f| f.name == "timestamp")
                .and_then(|f| f.value_as_f64(0))
        };
        assert_eq!(ts(&records[0]), Some(1_000_030.0));
        assert_eq!(ts(&records[1]), Some(1_000_031.0));
        assert_eq!(ts(&records[2]), Some(1_000_034.0));
    }

    #[test]
    fn compressed_timestamp_without_reference_counts_from_zero() {
        let mut builder = FitFileBuilder::new();
        builder
            .define(0, RECORD, &[(3, 1, BaseType::Uint8)])
            .compressed(0, 5, &[90])
            .compressed(0, 3, &[91]);

        let records = decode(builder.finish()).unwrap();
        assert_eq!(records.len(), 2);

        let ts = |r: &Record| {
            r.fields
                .iter()
                .find(|f| f.name == "timestamp")
                .and_then(|f| f.value_as_f64(0))
        };
        assert_eq!(ts(&records[0]), Some(5.0));
        assert_eq!(ts(&records[1]), Some(35.0));
        assert_eq!(records[1].fields[0].value_as_f64(0), Some(91.0));
    }

    #[test]
    fn developer_fields_are_skipped() {
        let mut builder = FitFileBuilder::new();
        builder
            .define_with_developer(0, RECORD, &[(3, 1, BaseType::Uint8)], &[(0, 4, 0)])
            .data(0, &[70, 0xAA, 0xBB, 0xCC, 0xDD])
            .data(0, &[71, 0, 0, 0, 0]);

        let records = decode(builder.finish()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].fields.len(), 1);
        assert_eq!(records[1].fields[0].value_as_f64(0), Some(71.0));
    }

    #[test]
    fn undefined_local_type_is_fatal() {
        let mut builder = FitFileBuilder::new();
        builder.data(5, &[1]);
        assert!(matches!(
            decode(builder.finish()),
            Err(FitError::UndefinedLocalType { local_type: 5, .. })
        ));
    }

    #[test]
    fn truncated_message_is_fatal() {
        let mut builder = FitFileBuilder::new();
        builder
            .define(0, RECORD, &[(253, 4, BaseType::Uint32)])
            .raw(&[0x00, 0x01, 0x02]);
        assert!(matches!(
            decode(builder.finish()),
            Err(FitError::Truncated { .. })
        ));
    }

    #[test]
    fn chained_segments_decode_in_order_with_fresh_definitions() {
        let mut first = FitFileBuilder::new();
        first.define(0, RECORD, &[(3, 1, BaseType::Uint8)]).data(0, &[1]);
        let mut second = FitFileBuilder::new();
        second.define(0, 18, &[(16, 1, BaseType::Uint8)]).data(0, &[2]);

        let mut bytes = first.finish();
        bytes.extend(second.finish());

        let decoder = FitDecoder::from_bytes(bytes);
        assert_eq!(decoder.check_integrity().unwrap().len(), 2);

        let mut records = Vec::new();
        let summary = decoder.run(&mut records).unwrap();
        assert_eq!(summary.segments, 2);
        assert_eq!(records[0].type_name, "record");
        assert_eq!(records[1].type_name, "session");
        assert_eq!(records[1].fields[0].name, "avg_heart_rate");
    }

    #[test]
    fn corrupted_body_fails_integrity() {
        let mut builder = FitFileBuilder::new();
        builder.define(0, RECORD, &[(3, 1, BaseType::Uint8)]).data(0, &[60]);
        let mut bytes = builder.finish();
        let last_data = bytes.len() - 3;
        bytes[last_data] ^= 0xFF;

        assert!(matches!(
            FitDecoder::from_bytes(bytes).check_integrity(),
            Err(FitError::FileCrcMismatch { .. })
        ));
    }

    #[test]
    fn empty_input_fails_integrity() {
        assert!(matches!(
            FitDecoder::from_bytes(Vec::new()).check_integrity(),
            Err(FitError::Empty)
        ));
    }

    #[test]
    fn truncated_file_fails_integrity() {
        let mut builder = FitFileBuilder::new();
        builder.define(0, RECORD, &[(3, 1, BaseType::Uint8)]).data(0, &[60]);
        let mut bytes = builder.finish();
        bytes.truncate(bytes.len() - 4);

        assert!(matches!(
            FitDecoder::from_bytes(bytes).check_integrity(),
            Err(FitError::Truncated { .. })
        ));
    }
}
