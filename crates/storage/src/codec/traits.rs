//! Storage codec trait definitions.

/// Storage codec trait.
///
/// Every record payload passes through a codec on its way to and from disk.
/// This is the seam for compression and encryption at rest.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync` so one instance can serve every book of a
/// store from many threads.
///
/// # Codec Identity
///
/// Each codec has a numeric id written into every record file header, and a
/// name used in `quire.toml`. Files are decoded with the codec named in their
/// own header, so changing the configured codec never orphans old files.
pub trait StorageCodec: Send + Sync {
    /// Encode bytes for storage.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes from storage.
    ///
    /// Reverses the encode operation. Returns an error if the data
    /// cannot be decoded (e.g., decompression failure, corruption).
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Numeric id stored in the record file header
    fn id(&self) -> u8;

    /// Codec name as written in configuration
    fn codec_id(&self) -> &str;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Encoding failed
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// Decoding failed (e.g., truncated frame, invalid format).
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Unknown codec name.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    /// Unknown numeric codec id in a file header.
    #[error("Unknown codec id: {0}")]
    UnknownCodecId(u8),
}
