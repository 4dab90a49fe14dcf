//! Work item id <-> result file name

/// Suffix of every persisted result file
pub const RESULT_SUFFIX: &str = "_result.json";

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

/// Encode an id into a file-name-safe stem
///
/// ASCII letters, digits, `-` and `_` pass through; every other byte becomes
/// `%XX`. The result never starts with `.`.
///
/// # Examples
///
/// ```
/// use thera_store::{decode_id, encode_id};
///
/// assert_eq!(encode_id("vitamin b12"), "vitamin%20b12");
/// assert_eq!(decode_id("vitamin%20b12").as_deref(), Some("vitamin b12"));
/// ```
pub fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Reverse [`encode_id`]; `None` for stems it could not have produced
pub fn decode_id(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = stem
                    .get(i + 1..i + 3)
                    .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if is_plain(b) => {
                out.push(b);
                i += 1;
            }
            _ => return None,
        }
    }

    String::from_utf8(out).ok()
}

/// Result file name for `id`
pub(crate) fn result_file_name(id: &str) -> String {
    format!("{}{}", encode_id(id), RESULT_SUFFIX)
}

/// Work item id for a result file name, if it is one
pub(crate) fn id_from_file_name(name: &str) -> Option<String> {
    if name.starts_with('.') {
        return None;
    }
    decode_id(name.strip_suffix(RESULT_SUFFIX)?)
}
