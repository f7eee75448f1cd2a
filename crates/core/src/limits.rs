//! Size limits for keys and value graphs
//!
//! Defaults are conservative enough that an escaped key always fits in a
//! single file name component on common filesystems.

/// Default maximum key length in bytes
pub const DEFAULT_MAX_KEY_BYTES: usize = 200;

/// Default maximum nesting depth for encode and decode
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Highest nesting depth a store accepts
///
/// Encode and decode recurse once per level; deeper limits would let a
/// value exhaust the thread stack before the depth check fires.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Size limits for keys and value graphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum key length in bytes (default: 200)
    pub max_key_bytes: usize,

    /// Maximum nesting depth of a value graph (default: 128)
    ///
    /// Owned Rust values cannot form cycles, but shared pointers with interior
    /// mutability can; a graph deeper than this is rejected instead of
    /// recursing without bound.
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_key_bytes: DEFAULT_MAX_KEY_BYTES,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl Limits {
    /// Limits with a custom nesting depth, capped at [`MAX_NESTING_DEPTH`]
    pub fn with_max_depth(max_nesting_depth: usize) -> Self {
        Limits {
            max_nesting_depth: max_nesting_depth.min(MAX_NESTING_DEPTH),
            ..Limits::default()
        }
    }
}
