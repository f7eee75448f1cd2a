//! Error surfaces seen by callers.

use crate::common::{all_stores, TestStore};
use quire::{Error, KeyError, Object, Quire, QuireConfig, Registry, Serializer, Vacant};
use std::fs;

#[derive(Debug, Clone, PartialEq, Object)]
struct Person {
    name: String,
    age: u32,
}

#[derive(Debug, Clone, PartialEq, Object)]
struct City {
    name: String,
}

fn julia() -> Person {
    Person {
        name: "Julia".to_string(),
        age: 42,
    }
}

#[test]
fn test_missing_key_is_not_found() {
    for store in all_stores() {
        let err = store.quire.default_book().read::<Person>("nobody").unwrap_err();
        assert!(err.is_not_found(), "{}: {err}", store.label);
    }
}

#[test]
fn test_reading_as_other_type_is_mismatch() {
    for store in all_stores() {
        let book = store.quire.default_book();
        book.write("obj", &julia()).unwrap();

        match book.read::<City>("obj").unwrap_err() {
            Error::TypeMismatch { expected, found } => {
                assert!(expected.ends_with("City"), "{expected}");
                assert!(found.ends_with("Person"), "{found}");
            }
            other => panic!("{}: unexpected error {other}", store.label),
        }
        assert!(book.read::<String>("obj").unwrap_err().is_type_mismatch());
        assert!(book.read::<Vec<Person>>("obj").unwrap_err().is_type_mismatch());
    }
}

#[test]
fn test_tag_unknown_to_process_is_unknown_type() {
    // Never written or registered through the process-wide registry.
    #[derive(Debug, Object)]
    #[quire(tag = "errors::Unregistered")]
    struct Unregistered {
        value: u8,
    }

    let store = TestStore::disk();
    let book = store.quire.default_book();
    let scratch = Registry::new();
    let record = Serializer::new(&scratch)
        .serialize("ghost", &Unregistered { value: 1 })
        .unwrap();
    let bytes =
        quire_storage::format::encode_record(&record, &quire_storage::IdentityCodec).unwrap();

    let file = book.path_for("ghost").unwrap().unwrap();
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, bytes).unwrap();

    match book.read_dyn("ghost").unwrap_err() {
        Error::UnknownType(tag) => assert_eq!(tag.as_str(), "errors::Unregistered"),
        other => panic!("unexpected error {other}"),
    }
    assert!(matches!(
        book.read::<Person>("ghost"),
        Err(Error::UnknownType(_))
    ));

    // The static path needs no registry.
    assert_eq!(book.read::<Unregistered>("ghost").unwrap().value, 1);
}

#[test]
fn test_damaged_file_is_corrupt_and_contained() {
    for config in [
        QuireConfig::default(),
        QuireConfig {
            codec: "zstd".to_string(),
            ..QuireConfig::default()
        },
    ] {
        let store = TestStore::disk_with(config);
        let book = store.quire.default_book();
        book.write("good", &julia()).unwrap();
        book.write("bad", &julia()).unwrap();

        let file = book.path_for("bad").unwrap().unwrap();
        let bytes = fs::read(&file).unwrap();
        fs::write(&file, &bytes[..bytes.len() / 2]).unwrap();

        match book.read::<Person>("bad").unwrap_err() {
            Error::CorruptRecord { key, .. } => assert_eq!(key, "bad"),
            other => panic!("unexpected error {other}"),
        }
        assert!(book.read_dyn("bad").unwrap_err().is_corrupt());
        assert_eq!(book.read::<Person>("good").unwrap(), julia());

        // Overwriting repairs the key.
        book.write("bad", &julia()).unwrap();
        assert_eq!(book.read::<Person>("bad").unwrap(), julia());
    }
}

#[derive(Debug, Object)]
enum Chain {
    End,
    Link(Box<Chain>),
}

fn chain(depth: usize) -> Chain {
    (0..depth).fold(Chain::End, |inner, _| Chain::Link(Box::new(inner)))
}

#[test]
fn test_excessive_nesting_is_rejected_on_write() {
    for store in all_stores() {
        let book = store.quire.default_book();
        let err = book.write("deep", &chain(200)).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)), "{}: {err}", store.label);
        assert!(!book.contains("deep").unwrap());

        book.write("shallow", &chain(20)).unwrap();
        assert!(matches!(book.read::<Chain>("shallow").unwrap(), Chain::Link(_)));
    }
}

#[test]
fn test_reader_with_lower_limit_rejects_deep_record() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let quire = Quire::open(dir.path()).unwrap();
        quire.default_book().write("chain", &chain(40)).unwrap();
    }

    let strict = QuireConfig {
        max_depth: 16,
        ..QuireConfig::default()
    };
    let quire = Quire::open_with_config(dir.path(), strict).unwrap();
    let err = quire.default_book().read::<Chain>("chain").unwrap_err();
    assert!(err.is_corrupt(), "{err}");
}

#[test]
fn test_invalid_keys_and_names() {
    for store in all_stores() {
        let book = store.quire.default_book();
        assert!(matches!(
            book.write("", &1u8),
            Err(Error::InvalidKey(KeyError::Empty))
        ));
        assert!(matches!(
            book.read::<u8>("a\0b"),
            Err(Error::InvalidKey(KeyError::ContainsNul))
        ));
        assert!(matches!(
            book.write(&"k".repeat(500), &1u8),
            Err(Error::InvalidKey(KeyError::TooLong { .. }))
        ));

        assert!(matches!(
            store.quire.book(""),
            Err(Error::InvalidBookName { .. })
        ));
        assert!(matches!(
            store.quire.book("default"),
            Err(Error::InvalidBookName { .. })
        ));
    }
}

#[test]
fn test_key_too_long_once_escaped_on_disk() {
    let key = "/".repeat(100);

    let disk = TestStore::disk();
    assert!(matches!(
        disk.quire.default_book().write(&key, &1u8),
        Err(Error::InvalidKey(KeyError::EscapedTooLong { .. }))
    ));

    let memory = TestStore::ephemeral();
    memory.quire.default_book().write(&key, &1u8).unwrap();
    assert_eq!(memory.quire.default_book().read::<u8>(&key).unwrap(), 1);
}

#[test]
fn test_vacant_root_is_rejected() {
    for store in all_stores() {
        let book = store.quire.default_book();
        assert!(matches!(
            book.write("nothing", &Vacant),
            Err(Error::Serialization(_))
        ));
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    for config in [
        QuireConfig {
            durability: "sometimes".to_string(),
            ..QuireConfig::default()
        },
        QuireConfig {
            codec: "lz4".to_string(),
            ..QuireConfig::default()
        },
        QuireConfig {
            max_depth: 0,
            ..QuireConfig::default()
        },
        QuireConfig {
            max_depth: 1000,
            ..QuireConfig::default()
        },
    ] {
        let err = Quire::open_with_config(dir.path(), config).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    }

    fs::write(dir.path().join(quire::CONFIG_FILE_NAME), "max_depth = \"deep\"").unwrap();
    assert!(matches!(Quire::open(dir.path()), Err(Error::Config(_))));

    fs::write(dir.path().join(quire::CONFIG_FILE_NAME), "max_depth = 1000").unwrap();
    assert!(matches!(Quire::open(dir.path()), Err(Error::Config(_))));
}

#[test]
fn test_ephemeral_depth_is_capped() {
    let quire = Quire::ephemeral_with_config(QuireConfig {
        max_depth: 1000,
        ..QuireConfig::default()
    });
    let book = quire.default_book();
    assert!(matches!(
        book.write("deep", &chain(200)),
        Err(Error::Serialization(_))
    ));
    book.write("shallow", &chain(20)).unwrap();
}
