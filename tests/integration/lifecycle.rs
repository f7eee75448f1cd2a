//! Book lifecycle: destroy, isolation and per-key operations.

use crate::common::{all_stores, TestStore};
use quire::{Error, Object};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Debug, Clone, PartialEq, Object)]
struct Note {
    text: String,
    version: u32,
}

fn note(text: &str, version: u32) -> Note {
    Note {
        text: text.to_string(),
        version,
    }
}

#[test]
fn test_destroy_then_read_is_not_found() {
    for store in all_stores() {
        let book = store.quire.book("scratch").unwrap();
        book.write("obj", &note("x", 1)).unwrap();

        book.destroy().unwrap();

        let err = book.read::<Note>("obj").unwrap_err();
        match err {
            Error::NotFound { book, key } => {
                assert_eq!(book, "scratch");
                assert_eq!(key, "obj");
            }
            other => panic!("{}: unexpected error {other}", store.label),
        }
    }
}

#[test]
fn test_destroy_is_idempotent() {
    for store in all_stores() {
        let book = store.quire.book("twice").unwrap();
        book.write("a", &note("a", 1)).unwrap();

        book.destroy().unwrap();
        book.destroy().unwrap();
        assert!(book.read::<Note>("a").unwrap_err().is_not_found());

        // Never-written books destroy cleanly too.
        store.quire.book("never").unwrap().destroy().unwrap();
    }
}

#[test]
fn test_book_usable_after_destroy() {
    for store in all_stores() {
        let book = store.quire.book("reborn").unwrap();
        book.write("k", &note("old", 1)).unwrap();
        book.destroy().unwrap();

        book.write("k", &note("new", 2)).unwrap();
        assert_eq!(book.read::<Note>("k").unwrap(), note("new", 2));
        assert_eq!(book.keys().unwrap(), vec!["k".to_string()]);
    }
}

#[test]
fn test_namespace_isolation() {
    for store in all_stores() {
        let a = store.quire.book("A").unwrap();
        let b = store.quire.book("B").unwrap();

        a.write("k", &note("in a", 1)).unwrap();
        assert!(b.read::<Note>("k").unwrap_err().is_not_found());
        assert!(!b.contains("k").unwrap());

        b.write("k", &note("in b", 2)).unwrap();
        a.destroy().unwrap();
        assert_eq!(b.read::<Note>("k").unwrap().text, "in b");
        assert!(!store.quire.default_book().contains("k").unwrap());
    }
}

#[test]
fn test_default_book_is_its_own_namespace() {
    for store in all_stores() {
        let default = store.quire.default_book();
        default.write("k", &note("default", 1)).unwrap();

        assert!(store.quire.book("other").unwrap().read::<Note>("k").is_err());
        assert!(matches!(
            store.quire.book("default"),
            Err(Error::InvalidBookName { .. })
        ));
        assert_eq!(default.name(), quire::DEFAULT_BOOK);
    }
}

#[test]
fn test_book_handles_are_cached() {
    let store = TestStore::ephemeral();
    let first = store.quire.book("cached").unwrap();
    let second = store.quire.book("cached").unwrap();
    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&store.quire.book("other").unwrap()));
}

#[test]
fn test_key_operations() {
    for store in all_stores() {
        let book = store.quire.book("keys").unwrap();
        assert!(book.keys().unwrap().is_empty());
        assert_eq!(book.last_modified("a").unwrap(), None);

        for key in ["a", "b/c", "with space", ".hidden", "ünïcode"] {
            book.write(key, &note(key, 0)).unwrap();
        }

        let mut keys = book.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec![".hidden", "a", "b/c", "with space", "ünïcode"]);
        assert_eq!(book.read::<Note>("b/c").unwrap().text, "b/c");
        assert!(book.contains("with space").unwrap());
        assert!(book.last_modified("a").unwrap().is_some());

        book.delete("a").unwrap();
        book.delete("a").unwrap();
        assert!(!book.contains("a").unwrap());
        assert_eq!(book.keys().unwrap().len(), 4);
    }
}

#[test]
fn test_read_or_falls_back_only_when_absent() {
    for store in all_stores() {
        let book = store.quire.default_book();
        assert_eq!(book.read_or("missing", 5u32).unwrap(), 5);

        book.write("present", &9u32).unwrap();
        assert_eq!(book.read_or("present", 5u32).unwrap(), 9);

        // Other errors still surface.
        assert!(book.read_or("present", String::new()).unwrap_err().is_type_mismatch());
    }
}

#[test]
fn test_paths_exist_only_on_disk() {
    for store in all_stores() {
        let book = store.quire.book("paths").unwrap();
        book.write("k", &1u8).unwrap();

        let path = book.path().unwrap();
        let file = book.path_for("k").unwrap();
        if store.quire.is_ephemeral() {
            assert!(path.is_none());
            assert!(file.is_none());
        } else {
            let path = path.unwrap();
            let file = file.unwrap();
            assert!(path.is_dir());
            assert!(file.is_file());
            assert!(file.starts_with(&path));
        }
    }
}

#[test]
fn test_concurrent_writers_and_destroy() {
    const WRITERS: usize = 4;
    const ROUNDS: u32 = 50;

    for store in all_stores() {
        let book = store.quire.book("busy").unwrap();
        let barrier = Arc::new(Barrier::new(WRITERS + 1));

        let handles: Vec<_> = (0..WRITERS)
            .map(|t| {
                let book = book.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for round in 0..ROUNDS {
                        book.write("shared", &note("shared", round)).unwrap();
                        book.write(&format!("own-{t}"), &note("own", round)).unwrap();
                        match book.read::<Note>("shared") {
                            Ok(n) => assert_eq!(n.text, "shared"),
                            Err(e) => assert!(e.is_not_found(), "{e}"),
                        }
                    }
                })
            })
            .collect();

        barrier.wait();
        for _ in 0..5 {
            book.destroy().unwrap();
        }
        for handle in handles {
            handle.join().unwrap();
        }

        book.destroy().unwrap();
        assert!(book.keys().unwrap().is_empty(), "{}", store.label);
        assert!(book.read::<Note>("shared").unwrap_err().is_not_found());
    }
}
