//! Record file format
//!
//! Every key is stored as one self-describing file:
//!
//! ```text
//! magic("QREC", 4) + version(u16) + codec_id(u8) + reserved(u8)
//! + payload_len(u64) + payload(payload_len) + crc32(u32)
//! ```
//!
//! All integers are little-endian. The payload is the MessagePack encoding
//! of a [`Record`], passed through the storage codec named by `codec_id`.
//! The CRC covers every byte before it. Any validation failure surfaces as
//! `CorruptRecord` for the key being read; other keys are unaffected.

use crate::codec::{codec_by_id, CodecError, StorageCodec};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use quire_core::{Error, Record, Result};
use std::io::Cursor;

/// Magic bytes at the start of every record file.
pub const RECORD_MAGIC: &[u8; 4] = b"QREC";

/// Current record file format version.
pub const RECORD_FORMAT_VERSION: u16 = 1;

/// Bytes before the payload.
pub const HEADER_SIZE: usize = 16;

/// Bytes after the payload.
pub const TRAILER_SIZE: usize = 4;

/// Structural problems found while parsing a record file.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// File shorter than header plus trailer
    #[error("file too short: {actual} bytes, need at least {expected}")]
    TooShort {
        /// Minimum size
        expected: usize,
        /// Size found
        actual: usize,
    },

    /// File does not start with the record magic
    #[error("invalid magic bytes")]
    InvalidMagic,

    /// Format version written by a newer or unknown release
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    /// Declared payload length disagrees with the file size
    #[error("payload length {declared} does not match {actual} bytes on disk")]
    LengthMismatch {
        /// Length from the header
        declared: u64,
        /// Length actually present
        actual: u64,
    },

    /// CRC over header and payload does not match the trailer
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// CRC from the trailer
        stored: u32,
        /// CRC of the bytes read
        computed: u32,
    },

    /// Storage codec missing or unable to decode the payload
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// Payload bytes are not a MessagePack record
    #[error("payload is not a record: {0}")]
    Payload(String),

    /// Record was written under a different key
    #[error("record belongs to key '{0}'")]
    KeyMismatch(String),

    /// Header read failed
    #[error("header read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode `record` into record file bytes using `codec` for the payload.
///
/// # Errors
/// `Serialization` if the record or the codec fails to encode.
pub fn encode_record(record: &Record, codec: &dyn StorageCodec) -> Result<Vec<u8>> {
    let payload = rmp_serde::to_vec(record).map_err(|e| Error::Serialization(e.to_string()))?;
    let payload = codec
        .encode(&payload)
        .map_err(|e| Error::Serialization(e.to_string()))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len() + TRAILER_SIZE);
    buf.extend_from_slice(RECORD_MAGIC);
    buf.write_u16::<LittleEndian>(RECORD_FORMAT_VERSION)?;
    buf.write_u8(codec.id())?;
    buf.write_u8(0)?;
    buf.write_u64::<LittleEndian>(payload.len() as u64)?;
    buf.extend_from_slice(&payload);

    let crc = crc32fast::hash(&buf);
    buf.write_u32::<LittleEndian>(crc)?;
    Ok(buf)
}

/// Decode record file bytes read for `key`.
///
/// # Errors
/// `CorruptRecord` if the bytes fail any structural check, or hold a record
/// written under another key.
pub fn decode_record(key: &str, data: &[u8]) -> Result<Record> {
    parse_record(key, data).map_err(|e| Error::corrupt(key, e.to_string()))
}

fn parse_record(key: &str, data: &[u8]) -> std::result::Result<Record, FormatError> {
    let minimum = HEADER_SIZE + TRAILER_SIZE;
    if data.len() < minimum {
        return Err(FormatError::TooShort {
            expected: minimum,
            actual: data.len(),
        });
    }

    if &data[0..4] != RECORD_MAGIC {
        return Err(FormatError::InvalidMagic);
    }

    let mut header = Cursor::new(&data[4..HEADER_SIZE]);
    let version = header.read_u16::<LittleEndian>()?;
    if version != RECORD_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let codec_id = header.read_u8()?;
    let _reserved = header.read_u8()?;
    let declared = header.read_u64::<LittleEndian>()?;

    let actual = (data.len() - minimum) as u64;
    if declared != actual {
        return Err(FormatError::LengthMismatch { declared, actual });
    }

    let crc_offset = data.len() - TRAILER_SIZE;
    let stored = Cursor::new(&data[crc_offset..]).read_u32::<LittleEndian>()?;
    let computed = crc32fast::hash(&data[..crc_offset]);
    if stored != computed {
        return Err(FormatError::ChecksumMismatch { stored, computed });
    }

    let codec = codec_by_id(codec_id)?;
    let payload = codec.decode(&data[HEADER_SIZE..crc_offset])?;
    let record: Record =
        rmp_serde::from_slice(&payload).map_err(|e| FormatError::Payload(e.to_string()))?;

    if record.key != key {
        return Err(FormatError::KeyMismatch(record.key));
    }
    Ok(record)
}
