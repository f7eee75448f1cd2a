//! Integration Tests
//!
//! Cross-crate scenarios through the public `quire` facade, each run
//! against every storage mode (disk, disk with zstd + cache durability,
//! ephemeral):
//! - Round trips of every supported value shape
//! - Book lifecycle: destroy, isolation, key operations
//! - Schema drift between writer and reader layouts
//! - Polymorphic fields and dynamic reads
//! - Error surfaces
//! - Generated-value properties

#[path = "../common/mod.rs"]
mod common;

mod errors;
mod lifecycle;
mod properties;
mod round_trip;
mod schema_drift;
