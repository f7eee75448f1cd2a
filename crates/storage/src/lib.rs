//! Key-value persistence layer for Quire
//!
//! This crate maps `(book, key)` to a durable [`Record`](quire_core::Record):
//! - RecordStore: the backend trait (put/get/delete/keys/delete_all)
//! - FileStore: one checksummed file per key, atomic replace via rename
//! - MemoryStore: same semantics in process memory
//! - KeyLocker: per-key exclusion with a per-book gate for `delete_all`
//! - codec: storage codec seam (identity, zstd)
//! - format: the record file layout

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod escape;
pub mod file;
pub mod format;
pub mod locker;
pub mod memory;
pub mod store;

pub use codec::{codec_by_id, get_codec, CodecError, IdentityCodec, StorageCodec, ZstdCodec};
pub use file::FileStore;
pub use locker::{BookGuard, KeyGuard, KeyLocker, SharedGuard};
pub use memory::MemoryStore;
pub use store::{Durability, RecordStore};
