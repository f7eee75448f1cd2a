//! Identity codec (no transformation).
//!
//! The default codec. Payload bytes are stored exactly as the serializer
//! produced them.

use super::traits::{CodecError, StorageCodec};

/// Identity codec - no transformation.
///
/// # Example
///
/// ```
/// use quire_storage::codec::{IdentityCodec, StorageCodec};
///
/// let codec = IdentityCodec;
/// let data = b"hello world";
///
/// let encoded = codec.encode(data).unwrap();
/// assert_eq!(data.as_slice(), encoded.as_slice());
///
/// let decoded = codec.decode(&encoded).unwrap();
/// assert_eq!(data.as_slice(), decoded.as_slice());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl IdentityCodec {
    /// Header id of the identity codec
    pub const ID: u8 = 0;
}

impl StorageCodec for IdentityCodec {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }

    fn id(&self) -> u8 {
        Self::ID
    }

    fn codec_id(&self) -> &str {
        "identity"
    }
}
