//! Round-trip properties over generated values.

use crate::common::TestStore;
use proptest::collection::{btree_map, vec};
use proptest::option;
use proptest::prelude::*;
use quire::{Object, Quire};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Object)]
struct Sample {
    id: u64,
    delta: i32,
    score: f64,
    label: String,
    flags: Vec<bool>,
    note: Option<String>,
    counts: BTreeMap<String, u16>,
    inner: Vec<Leaf>,
}

#[derive(Debug, Clone, PartialEq, Object)]
enum Leaf {
    Blank,
    Text(String),
    Point { x: i16, y: i16 },
}

fn leaf() -> impl Strategy<Value = Leaf> {
    prop_oneof![
        Just(Leaf::Blank),
        ".{0,12}".prop_map(Leaf::Text),
        (any::<i16>(), any::<i16>()).prop_map(|(x, y)| Leaf::Point { x, y }),
    ]
}

prop_compose! {
    fn sample()(
        id in any::<u64>(),
        delta in any::<i32>(),
        // NaN never equals itself, so stay finite.
        score in -1.0e12f64..1.0e12,
        label in ".{0,32}",
        flags in vec(any::<bool>(), 0..8),
        note in option::of("[a-z ]{0,16}"),
        counts in btree_map("[a-z]{1,6}", any::<u16>(), 0..6),
        inner in vec(leaf(), 0..6),
    ) -> Sample {
        Sample { id, delta, score, label, flags, note, counts, inner }
    }
}

fn stores() -> (TestStore, Arc<Quire>) {
    let disk = TestStore::disk();
    (disk, Quire::ephemeral())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_sample_round_trips(value in sample(), key in "[a-zA-Z0-9 ./%_-]{1,40}") {
        let (disk, memory) = stores();
        for quire in [&disk.quire, &memory] {
            let book = quire.book("props").unwrap();
            book.write(&key, &value).unwrap();
            prop_assert_eq!(book.read::<Sample>(&key).unwrap(), value.clone());
            prop_assert!(book.contains(&key).unwrap());
            prop_assert_eq!(book.keys().unwrap(), vec![key.clone()]);
        }
    }

    #[test]
    fn prop_last_write_wins(values in vec(sample(), 1..5)) {
        let store = TestStore::disk();
        let book = store.quire.default_book();
        for value in &values {
            book.write("slot", value).unwrap();
        }
        prop_assert_eq!(book.read::<Sample>("slot").unwrap(), values[values.len() - 1].clone());
    }

    #[test]
    fn prop_books_stay_isolated(names in vec("[a-zA-Z0-9 ./]{1,12}", 2..5), n in any::<u32>()) {
        let quire = Quire::ephemeral();
        let mut names = names;
        names.sort();
        names.dedup();
        names.retain(|name| name != "default");

        for (i, name) in names.iter().enumerate() {
            quire.book(name).unwrap().write("k", &(n, i as u32)).unwrap();
        }
        for (i, name) in names.iter().enumerate() {
            let stored: (u32, u32) = quire.book(name).unwrap().read("k").unwrap();
            prop_assert_eq!(stored, (n, i as u32));
        }
    }
}
