//! Round trips of every supported value shape through each storage mode.

use crate::common::all_stores;
use chrono::{TimeZone, Utc};
use quire::{Book, Codec, Object, Persist};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

fn round_trip<T: Codec>(book: &Book, key: &str, value: &T) -> T {
    book.write(key, value).unwrap();
    book.read::<T>(key).unwrap()
}

// ============================================================================
// Construction-independent types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Object)]
struct Person {
    name: String,
    age: u32,
}

#[derive(Debug, Clone, PartialEq, Object)]
struct Settings {
    title: String,
    retries: u8,
    verbose: bool,
}

impl Settings {
    fn new(title: &str) -> Self {
        Settings::with(title, 3, false)
    }

    fn with(title: &str, retries: u8, verbose: bool) -> Self {
        Settings {
            title: title.to_string(),
            retries,
            verbose,
        }
    }
}

/// Derived state filled in by a callback after construction.
#[derive(Debug, Clone, PartialEq, Object)]
struct Invoice {
    lines: Vec<u64>,
    total: u64,
    #[quire(skip)]
    dirty: bool,
}

impl Invoice {
    fn build(lines: Vec<u64>, finish: impl FnOnce(&mut Invoice)) -> Self {
        let mut invoice = Invoice {
            lines,
            total: 0,
            dirty: true,
        };
        finish(&mut invoice);
        invoice
    }
}

#[test]
fn test_person_keeps_fields_and_type() {
    for store in all_stores() {
        let book = store.quire.default_book();
        let julia = Person {
            name: "Julia".to_string(),
            age: 42,
        };
        book.write("obj", &julia).unwrap();

        let back: Person = book.read("obj").unwrap();
        assert_eq!(back.name, "Julia", "{}", store.label);
        assert_eq!(back.age, 42, "{}", store.label);

        let dynamic = book.read_dyn("obj").unwrap();
        assert!(dynamic.is::<Person>(), "{}", store.label);
        assert_eq!(dynamic.persist_tag(), Person::type_tag());
    }
}

#[test]
fn test_defaults_and_explicit_arguments_round_trip_independently() {
    for store in all_stores() {
        let book = store.quire.book("settings").unwrap();
        let defaulted = Settings::new("a");
        let explicit = Settings::with("b", 9, true);

        book.write("defaulted", &defaulted).unwrap();
        book.write("explicit", &explicit).unwrap();

        assert_eq!(book.read::<Settings>("defaulted").unwrap(), defaulted);
        assert_eq!(book.read::<Settings>("explicit").unwrap(), explicit);
    }
}

#[test]
fn test_post_construction_state_is_restored_without_replay() {
    for store in all_stores() {
        let book = store.quire.default_book();
        let invoice = Invoice::build(vec![10, 20, 12], |inv| {
            inv.total = inv.lines.iter().sum::<u64>() * 2;
            inv.lines.push(99);
        });
        assert_eq!(invoice.total, 84);

        let back = round_trip(&book, "invoice", &invoice);
        assert_eq!(back.lines, vec![10, 20, 12, 99]);
        assert_eq!(back.total, 84);
        // Skipped fields come back at their default.
        assert!(!back.dirty);
    }
}

#[test]
fn test_type_defined_inside_function() {
    #[derive(Debug, PartialEq, Object)]
    struct LocalPoint {
        x: i32,
        y: i32,
    }

    for store in all_stores() {
        let book = store.quire.default_book();
        let point = LocalPoint { x: -3, y: 7 };
        assert_eq!(round_trip(&book, "point", &point), point);
        assert!(book.read_dyn("point").unwrap().is::<LocalPoint>());
    }
}

// ============================================================================
// Enums, tuple and unit structs, generics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Object)]
enum Shape {
    Empty,
    Circle { radius: f64 },
    Rect(f64, f64),
}

#[derive(Debug, Clone, PartialEq, Object)]
struct Meters(f64);

#[derive(Debug, Clone, PartialEq, Object)]
struct Marker;

#[derive(Debug, Clone, PartialEq, Object)]
struct Pair<A, B> {
    left: A,
    right: B,
}

#[derive(Debug, Clone, PartialEq, Object)]
struct Renamed {
    #[quire(rename = "display_name")]
    name: String,
    count: u16,
}

#[test]
fn test_enum_variants() {
    for store in all_stores() {
        let book = store.quire.default_book();
        for (i, shape) in [
            Shape::Empty,
            Shape::Circle { radius: 1.5 },
            Shape::Rect(2.0, 3.25),
        ]
        .into_iter()
        .enumerate()
        {
            let key = format!("shape-{i}");
            assert_eq!(round_trip(&book, &key, &shape), shape, "{}", store.label);
        }
    }
}

#[test]
fn test_tuple_unit_and_generic_structs() {
    for store in all_stores() {
        let book = store.quire.default_book();
        assert_eq!(round_trip(&book, "meters", &Meters(12.5)), Meters(12.5));
        assert_eq!(round_trip(&book, "marker", &Marker), Marker);

        let pair = Pair {
            left: "x".to_string(),
            right: vec![1u8, 2, 3],
        };
        assert_eq!(round_trip(&book, "pair", &pair), pair);

        let other = Pair { left: 1u64, right: true };
        assert_eq!(round_trip(&book, "pair-other", &other), other);
        // Instantiations are distinct types.
        assert!(book.read::<Pair<u64, bool>>("pair").is_err());
    }
}

#[test]
fn test_renamed_field() {
    for store in all_stores() {
        let book = store.quire.default_book();
        let value = Renamed {
            name: "n".to_string(),
            count: 4,
        };
        assert_eq!(round_trip(&book, "renamed", &value), value);
    }
}

// ============================================================================
// Standard shapes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Object)]
struct Everything {
    flag: bool,
    small: i8,
    big: u64,
    ratio: f32,
    letter: char,
    text: String,
    maybe: Option<String>,
    nothing: Option<u32>,
    list: Vec<i64>,
    queue: VecDeque<u8>,
    ordered: BTreeMap<String, u32>,
    unique: BTreeSet<i16>,
    hashed: HashMap<String, Vec<String>>,
    tags: HashSet<String>,
    tuple: (u8, String, bool),
    boxed: Box<Person>,
    shared: Arc<Settings>,
    nested: Vec<Option<Person>>,
    id: Uuid,
}

fn everything() -> Everything {
    let mut hashed = HashMap::new();
    hashed.insert("a".to_string(), vec!["1".to_string(), "2".to_string()]);
    hashed.insert("b".to_string(), vec![]);

    Everything {
        flag: true,
        small: -128,
        big: u64::MAX,
        ratio: 0.25,
        letter: 'ß',
        text: "héllo wörld".to_string(),
        maybe: Some("here".to_string()),
        nothing: None,
        list: vec![i64::MIN, 0, i64::MAX],
        queue: VecDeque::from(vec![3, 2, 1]),
        ordered: BTreeMap::from([("x".to_string(), 1), ("y".to_string(), 2)]),
        unique: BTreeSet::from([-1, 5, 9]),
        hashed,
        tags: HashSet::from(["red".to_string(), "blue".to_string()]),
        tuple: (7, "seven".to_string(), false),
        boxed: Box::new(Person {
            name: "Boxed".to_string(),
            age: 1,
        }),
        shared: Arc::new(Settings::new("shared")),
        nested: vec![
            None,
            Some(Person {
                name: "Inner".to_string(),
                age: 2,
            }),
        ],
        id: Uuid::new_v4(),
    }
}

#[test]
fn test_every_standard_shape() {
    for store in all_stores() {
        let book = store.quire.book("shapes").unwrap();
        let value = everything();
        assert_eq!(round_trip(&book, "all", &value), value, "{}", store.label);
    }
}

#[test]
fn test_primitive_and_collection_roots() {
    for store in all_stores() {
        let book = store.quire.default_book();
        assert_eq!(round_trip(&book, "int", &-17i32), -17);
        assert_eq!(round_trip(&book, "text", &"plain".to_string()), "plain");
        assert_eq!(round_trip(&book, "none", &Option::<u8>::None), None);
        assert_eq!(round_trip(&book, "unit", &()), ());

        let map: HashMap<u32, Person> = HashMap::from([(
            1,
            Person {
                name: "One".to_string(),
                age: 1,
            },
        )]);
        assert_eq!(round_trip(&book, "map", &map), map);

        let people = vec![
            Person {
                name: "A".to_string(),
                age: 10,
            },
            Person {
                name: "B".to_string(),
                age: 20,
            },
        ];
        assert_eq!(round_trip(&book, "people", &people), people);
    }
}

#[test]
fn test_timestamps_keep_nanoseconds() {
    for store in all_stores() {
        let book = store.quire.default_book();
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        assert_eq!(round_trip(&book, "at", &at), at);

        let now = Utc::now();
        assert_eq!(round_trip(&book, "now", &now), now);
    }
}

#[test]
fn test_overwrite_replaces_type_and_value() {
    for store in all_stores() {
        let book = store.quire.default_book();
        book.write("slot", &Marker).unwrap();
        book.write("slot", &Meters(3.0)).unwrap();

        assert_eq!(book.read::<Meters>("slot").unwrap(), Meters(3.0));
        assert!(book.read::<Marker>("slot").unwrap_err().is_type_mismatch());
    }
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let value = everything();
    {
        let quire = quire::Quire::open(dir.path()).unwrap();
        quire.book("shapes").unwrap().write("all", &value).unwrap();
    }

    let quire = quire::Quire::open(dir.path()).unwrap();
    let back: Everything = quire.book("shapes").unwrap().read("all").unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_write_accepts_dynamic_reference() {
    for store in all_stores() {
        let book = store.quire.default_book();
        let value: &dyn Persist = &Person {
            name: "Dyn".to_string(),
            age: 5,
        };
        book.write("dyn", value).unwrap();
        assert_eq!(book.read::<Person>("dyn").unwrap().name, "Dyn");
    }
}
