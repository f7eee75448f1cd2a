//! Zstandard compression codec.

use super::traits::{CodecError, StorageCodec};

/// Default compression level
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Compresses payloads with zstd
///
/// The level only affects writing; any level decodes with any instance.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Header id of the zstd codec
    pub const ID: u8 = 1;

    /// Codec with the given compression level
    pub fn with_level(level: i32) -> Self {
        ZstdCodec { level }
    }

    /// Compression level used for writing
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        ZstdCodec::with_level(DEFAULT_ZSTD_LEVEL)
    }
}

impl StorageCodec for ZstdCodec {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        ::zstd::encode_all(data, self.level).map_err(|e| CodecError::EncodeError(e.to_string()))
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        ::zstd::decode_all(data).map_err(|e| CodecError::DecodeError(e.to_string()))
    }

    fn id(&self) -> u8 {
        Self::ID
    }

    fn codec_id(&self) -> &str {
        "zstd"
    }
}
