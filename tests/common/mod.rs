//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;`.

#![allow(dead_code)]

use quire::{Quire, QuireConfig};
use std::sync::{Arc, Once};
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Route library logs to the test output (shown for failing tests).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// A store plus the directory backing it, if any.
pub struct TestStore {
    pub quire: Arc<Quire>,
    pub label: &'static str,
    _dir: Option<TempDir>,
}

impl TestStore {
    pub fn disk() -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let quire = Quire::open(dir.path()).unwrap();
        TestStore {
            quire,
            label: "disk",
            _dir: Some(dir),
        }
    }

    pub fn disk_with(config: QuireConfig) -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let quire = Quire::open_with_config(dir.path(), config).unwrap();
        TestStore {
            quire,
            label: "disk-configured",
            _dir: Some(dir),
        }
    }

    pub fn ephemeral() -> Self {
        init_tracing();
        TestStore {
            quire: Quire::ephemeral(),
            label: "ephemeral",
            _dir: None,
        }
    }
}

/// Every storage mode, so each scenario runs against all of them.
pub fn all_stores() -> Vec<TestStore> {
    vec![
        TestStore::disk(),
        TestStore::disk_with(QuireConfig {
            durability: "cache".to_string(),
            codec: "zstd".to_string(),
            ..QuireConfig::default()
        }),
        TestStore::ephemeral(),
    ]
}
