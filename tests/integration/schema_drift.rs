//! Records written by one layout and read back by another.
//!
//! Each pair shares a tag, and only one side of each pair is ever written,
//! so the process-wide registry never sees both types under one tag.

use crate::common::all_stores;
use quire::{DriftKind, Error, Object};

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Grow")]
struct GrowBefore {
    a: u32,
    b: String,
}

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Grow")]
struct GrowAfter {
    a: u32,
    b: String,
    c: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Shrink")]
struct ShrinkBefore {
    a: u32,
    b: String,
    c: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Shrink")]
struct ShrinkAfter {
    a: u32,
    b: String,
}

#[test]
fn test_added_field_keeps_placeholder() {
    for store in all_stores() {
        let book = store.quire.book("drift").unwrap();
        book.write(
            "grow",
            &GrowBefore {
                a: 1,
                b: "b".to_string(),
            },
        )
        .unwrap();

        let (value, drift) = book.read_with_drift::<GrowAfter>("grow").unwrap();
        assert_eq!(value.a, 1, "{}", store.label);
        assert_eq!(value.b, "b");
        assert!(value.c.is_empty());

        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].field, "c");
        assert_eq!(drift[0].kind, DriftKind::Missing);
        assert_eq!(drift[0].tag.as_str(), "drift::Grow");
    }
}

#[test]
fn test_removed_field_is_ignored() {
    for store in all_stores() {
        let book = store.quire.book("drift").unwrap();
        book.write(
            "shrink",
            &ShrinkBefore {
                a: 2,
                b: "bb".to_string(),
                c: Some(9),
            },
        )
        .unwrap();

        let value: ShrinkAfter = book.read("shrink").unwrap();
        assert_eq!(
            value,
            ShrinkAfter {
                a: 2,
                b: "bb".to_string()
            }
        );

        let (_, drift) = book.read_with_drift::<ShrinkAfter>("shrink").unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].field, "c");
        assert_eq!(drift[0].kind, DriftKind::Ignored);
    }
}

#[test]
fn test_matching_layout_reports_no_drift() {
    for store in all_stores() {
        let book = store.quire.book("drift").unwrap();
        let value = GrowBefore {
            a: 3,
            b: String::new(),
        };
        book.write("same", &value).unwrap();

        let (back, drift) = book.read_with_drift::<GrowBefore>("same").unwrap();
        assert_eq!(back, value);
        assert!(drift.is_empty());
    }
}

// ============================================================================
// Field type and variant changes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Counter")]
struct SignedCounter {
    count: i64,
}

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Counter")]
struct UnsignedCounter {
    count: u16,
}

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Mode")]
enum ModeWithExtra {
    Off,
    On,
    Turbo { boost: u8 },
}

#[derive(Debug, Clone, PartialEq, Object)]
#[quire(tag = "drift::Mode")]
enum Mode {
    Off,
    On,
}

#[test]
fn test_integer_field_changes_sign_when_value_fits() {
    for store in all_stores() {
        let book = store.quire.book("drift").unwrap();
        book.write("fits", &SignedCounter { count: 700 }).unwrap();
        book.write("negative", &SignedCounter { count: -1 }).unwrap();
        book.write("huge", &SignedCounter { count: 1 << 40 }).unwrap();

        assert_eq!(book.read::<UnsignedCounter>("fits").unwrap().count, 700);
        assert!(book.read::<UnsignedCounter>("negative").unwrap_err().is_type_mismatch());
        assert!(book.read::<UnsignedCounter>("huge").unwrap_err().is_type_mismatch());
    }
}

#[test]
fn test_removed_variant_is_unknown() {
    for store in all_stores() {
        let book = store.quire.book("drift").unwrap();
        book.write("on", &ModeWithExtra::On).unwrap();
        book.write("turbo", &ModeWithExtra::Turbo { boost: 2 }).unwrap();

        assert_eq!(book.read::<Mode>("on").unwrap(), Mode::On);
        match book.read::<Mode>("turbo").unwrap_err() {
            Error::UnknownVariant { tag, variant } => {
                assert_eq!(tag.as_str(), "drift::Mode");
                assert_eq!(variant, "Turbo");
            }
            other => panic!("{}: unexpected error {other}", store.label),
        }
    }
}
