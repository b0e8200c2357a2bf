//! Minimal JSON scanning — C1.
//!
//! This never builds a DOM. It only locates element boundaries and object
//! fields inside a borrowed byte slice, returning `(offset, length)` ranges
//! rather than owned strings, so callers can slice the original buffer
//! zero-copy. Grounded directly on `pubnub_json_parse.{h,c}` from the
//! original C SDK (`examples/original_source/core/` before the retrieval
//! pack was lost — see the repo-level note in DESIGN.md); the function
//! names and the nine-variant object-parse error enum are carried over
//! unchanged in meaning.
use core::fmt;

/// A JSON element: a half-open byte range `[start, end)` into some buffer
/// the caller already owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elem {
    pub start: usize,
    pub end: usize,
}

impl Elem {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Failure kinds for [`get_object_value`], one per way a `{"key": value}`
/// scan can go wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonError {
    NoStartCurly,
    KeyMissing,
    KeyNotString,
    StringNotTerminated,
    MissingColon,
    ObjectIncomplete,
    MissingValueSeparator,
    KeyNotFound,
    InvalidKeyName,
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JsonError::NoStartCurly => "no starting curly brace",
            JsonError::KeyMissing => "key is missing from object definition",
            JsonError::KeyNotString => "key is not a string",
            JsonError::StringNotTerminated => "string not terminated",
            JsonError::MissingColon => "colon missing after key",
            JsonError::ObjectIncomplete => "ending curly brace missing",
            JsonError::MissingValueSeparator => "comma missing between pairs",
            JsonError::KeyNotFound => "key not found in object",
            JsonError::InvalidKeyName => "key name is empty or invalid",
        };
        f.write_str(s)
    }
}

const WHITESPACE: [u8; 4] = [b' ', b'\t', b'\r', b'\n'];

fn is_whitespace(b: u8) -> bool {
    WHITESPACE.contains(&b)
}

/// Returns the first position at or after `start` that is not whitespace.
pub fn skip_whitespace(buf: &[u8], start: usize, end: usize) -> usize {
    let mut i = start;
    while i < end && is_whitespace(buf[i]) {
        i += 1;
    }
    i
}

/// `start` must point just past an opening `"`. Returns the index of the
/// terminating `"`, honoring backslash escapes. Returns `end` if the string
/// is never terminated (including on an embedded `NUL`).
pub fn find_end_string(buf: &[u8], start: usize, end: usize) -> usize {
    let mut i = start;
    while i < end {
        match buf[i] {
            0 => return end,
            b'"' => return i,
            b'\\' => {
                i += 2;
                continue;
            }
            _ => i += 1,
        }
    }
    end
}

const PRIMITIVE_TERMINATORS: [u8; 6] = [b',', b'}', b']', b' ', b'\t', b'\r'];

fn is_primitive_terminator(b: u8) -> bool {
    PRIMITIVE_TERMINATORS.contains(&b) || b == b'\n'
}

/// Returns the index of the byte just before the first terminator
/// (`,}] \t\r\n`), i.e. the last byte of the primitive. Returns `end` if no
/// terminator is found.
pub fn find_end_primitive(buf: &[u8], start: usize, end: usize) -> usize {
    let mut i = start;
    while i < end {
        if is_primitive_terminator(buf[i]) {
            return i;
        }
        i += 1;
    }
    end
}

/// `start` must point at an opening `{` or `[`. Returns the index of the
/// matching closer, ignoring braces/brackets inside strings. Returns `end`
/// if unbalanced.
pub fn find_end_complex(buf: &[u8], start: usize, end: usize) -> usize {
    if start >= end {
        return end;
    }
    let opener = buf[start];
    let closer = match opener {
        b'{' => b'}',
        b'[' => b']',
        _ => return end,
    };
    let mut depth: i32 = 0;
    let mut i = start;
    while i < end {
        match buf[i] {
            b'"' => {
                i = find_end_string(buf, i + 1, end);
                if i >= end {
                    return end;
                }
            }
            b if b == opener => depth += 1,
            b if b == closer => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    end
}

/// Dispatches on the first byte at `start` to locate the end of whichever
/// JSON element begins there.
pub fn find_end_element(buf: &[u8], start: usize, end: usize) -> usize {
    if start >= end {
        return end;
    }
    match buf[start] {
        b'"' => find_end_string(buf, start + 1, end),
        b'{' | b'[' => find_end_complex(buf, start, end),
        _ => find_end_primitive(buf, start, end),
    }
}

/// Scans a `{"key": value, ...}` object for `key`, returning the element
/// (value) slice on success.
pub fn get_object_value(buf: &[u8], obj: Elem, key: &str) -> Result<Elem, JsonError> {
    let end = obj.end;
    let mut i = skip_whitespace(buf, obj.start, end);
    if i >= end || buf[i] != b'{' {
        return Err(JsonError::NoStartCurly);
    }
    i += 1;
    loop {
        i = skip_whitespace(buf, i, end);
        if i >= end {
            return Err(JsonError::ObjectIncomplete);
        }
        if buf[i] == b'}' {
            return Err(JsonError::KeyNotFound);
        }
        if buf[i] != b'"' {
            return Err(JsonError::KeyNotString);
        }
        let key_start = i + 1;
        let key_end = find_end_string(buf, key_start, end);
        if key_end >= end {
            return Err(JsonError::StringNotTerminated);
        }
        if key_end == key_start {
            return Err(JsonError::InvalidKeyName);
        }
        i = skip_whitespace(buf, key_end + 1, end);
        if i >= end || buf[i] != b':' {
            return Err(JsonError::MissingColon);
        }
        i = skip_whitespace(buf, i + 1, end);
        if i >= end {
            return Err(JsonError::KeyMissing);
        }
        let value_end = find_end_element(buf, i, end);
        let found = &buf[key_start..key_end] == key.as_bytes();
        let value = Elem::new(i, value_end);
        i = skip_whitespace(buf, value_end, end);
        if found {
            return Ok(value);
        }
        if i >= end {
            return Err(JsonError::ObjectIncomplete);
        }
        match buf[i] {
            b'}' => return Err(JsonError::KeyNotFound),
            b',' => i += 1,
            _ => return Err(JsonError::MissingValueSeparator),
        }
    }
}

/// Byte-for-byte comparison of a JSON string element's *contents* (without
/// quotes) against `s`.
pub fn elem_equals_string(buf: &[u8], e: Elem, s: &str) -> bool {
    e.slice(buf) == s.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_all_whitespace_kinds() {
        let buf = b" \t\r\nx";
        assert_eq!(skip_whitespace(buf, 0, buf.len()), 4);
    }

    #[test]
    fn finds_string_end_honoring_escapes() {
        let buf = br#"a\"b" rest"#;
        let end = find_end_string(buf, 0, buf.len());
        assert_eq!(buf[end], b'"');
        assert_eq!(&buf[..end], br#"a\"b"#);
    }

    #[test]
    fn finds_complex_end_with_nested_strings() {
        let buf = br#"{"a": "}", "b": 1}"#;
        let end = find_end_complex(buf, 0, buf.len());
        assert_eq!(end, buf.len() - 1);
    }

    #[test]
    fn get_object_value_finds_key() {
        let buf = br#"{"status": "200", "message": "OK"}"#;
        let obj = Elem::new(0, buf.len());
        let v = get_object_value(buf, obj, "message").unwrap();
        assert_eq!(v.slice(buf), br#""OK""#);
    }

    #[test]
    fn get_object_value_reports_key_not_found() {
        let buf = br#"{"status": "200"}"#;
        let obj = Elem::new(0, buf.len());
        assert_eq!(
            get_object_value(buf, obj, "missing"),
            Err(JsonError::KeyNotFound)
        );
    }

    #[test]
    fn get_object_value_requires_leading_curly() {
        let buf = br#"["a"]"#;
        let obj = Elem::new(0, buf.len());
        assert_eq!(
            get_object_value(buf, obj, "a"),
            Err(JsonError::NoStartCurly)
        );
    }

    #[test]
    fn elem_equals_string_matches_contents_only() {
        let buf = br#""403""#;
        let e = Elem::new(1, 4);
        assert!(elem_equals_string(buf, e, "403"));
    }
}
