//! Storage codec abstraction.
//!
//! Every record payload goes through a codec between the serializer and the
//! file. The codec id is written into each file header, so reading picks the
//! codec from the file, while writing uses the configured one.
//!
//! - `IdentityCodec` (`"identity"`, id 0): pass-through, the default
//! - `ZstdCodec` (`"zstd"`, id 1): zstd compression
//!
//! # Usage
//!
//! ```
//! use quire_storage::codec::{get_codec, codec_by_id};
//!
//! let codec = get_codec("zstd").unwrap();
//! let encoded = codec.encode(b"hello world").unwrap();
//!
//! let reader = codec_by_id(codec.id()).unwrap();
//! assert_eq!(reader.decode(&encoded).unwrap(), b"hello world");
//! ```

mod identity;
mod traits;
mod zstd_codec;

pub use zstd_codec::{ZstdCodec, DEFAULT_ZSTD_LEVEL};
pub use identity::IdentityCodec;
pub use traits::{CodecError, StorageCodec};

/// Get a codec by its configuration name.
///
/// # Known Codecs
///
/// - `"identity"`: No-op codec (pass-through)
/// - `"zstd"`: zstd compression at the default level
pub fn get_codec(codec_id: &str) -> Result<Box<dyn StorageCodec>, CodecError> {
    match codec_id {
        "identity" => Ok(Box::new(IdentityCodec)),
        "zstd" => Ok(Box::new(ZstdCodec::default())),
        _ => Err(CodecError::UnknownCodec(codec_id.to_string())),
    }
}

/// Get a codec by the numeric id found in a file header.
pub fn codec_by_id(id: u8) -> Result<Box<dyn StorageCodec>, CodecError> {
    match id {
        IdentityCodec::ID => Ok(Box::new(IdentityCodec)),
        ZstdCodec::ID => Ok(Box::new(ZstdCodec::default())),
        other => Err(CodecError::UnknownCodecId(other)),
    }
}
