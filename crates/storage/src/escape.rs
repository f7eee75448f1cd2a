//! File names for keys and books
//!
//! Any UTF-8 key must map to exactly one portable file name and back.
//! ASCII letters, digits, `-`, `_` and `.` are kept; every other byte
//! becomes `%XX` (uppercase hex). A leading `.` is escaped too, so no name
//! can be `.`, `..` or a hidden file.

use quire_core::KeyError;

/// Extension of record files
pub const RECORD_EXTENSION: &str = "qr";

/// Suffix appended to a record file name while it is being written
pub const TEMP_SUFFIX: &str = ".tmp";

/// Longest record file name, leaving room for [`TEMP_SUFFIX`] under the
/// common 255-byte file name limit
pub const MAX_FILE_NAME_BYTES: usize = 250;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.')
}

/// Escape `name` into a file-name-safe string
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, byte) in name.bytes().enumerate() {
        if is_plain(byte) && !(i == 0 && byte == b'.') {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0F) as usize] as char);
        }
    }
    out
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

/// Reverse [`escape_name`]
///
/// Returns `None` for names this module could not have produced.
pub fn unescape_name(escaped: &str) -> Option<String> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn check_length(name: String) -> Result<String, KeyError> {
    if name.len() > MAX_FILE_NAME_BYTES {
        return Err(KeyError::EscapedTooLong {
            escaped: name.len(),
            max: MAX_FILE_NAME_BYTES,
        });
    }
    Ok(name)
}

/// File name holding the record for `key`
///
/// # Errors
/// `EscapedTooLong` if the escaped name exceeds [`MAX_FILE_NAME_BYTES`].
pub fn record_file_name(key: &str) -> Result<String, KeyError> {
    check_length(format!("{}.{}", escape_name(key), RECORD_EXTENSION))
}

/// Directory name holding the records of `book`
///
/// # Errors
/// `EscapedTooLong` if the escaped name exceeds [`MAX_FILE_NAME_BYTES`].
pub fn book_dir_name(book: &str) -> Result<String, KeyError> {
    check_length(escape_name(book))
}

/// Key stored in the record file `file_name`
///
/// Returns `None` for temp files and anything else that is not a record file.
pub fn key_from_file_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(RECORD_EXTENSION)?.strip_suffix('.')?;
    unescape_name(stem)
}
