//! Process-wide registry of open stores
//!
//! Opening the same root twice in one process returns the same [`Quire`]
//! instance, so both handles share one lock table and one `.lock` file.
//! Entries are weak: a store closes when its last handle is dropped.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Weak;

use super::Quire;

/// Open stores by canonical root
pub static OPEN_STORES: Lazy<Mutex<HashMap<PathBuf, Weak<Quire>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
