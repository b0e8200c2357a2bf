//! Response parser — C3.
//!
//! Every parser here accepts the reply slice `[0, len)` and, on success,
//! returns a typed outcome plus iterator offsets so callers can stream
//! messages/channels without copying (spec.md §4.C3, §9 "in-place
//! reply-buffer splitting" design note — re-expressed here as immutable
//! `(offset, length)` ranges instead of NUL-splitting a mutable C string).
//!
//! Grounded on the teacher's `codec::decoder` (a typed decode outcome over
//! a borrowed buffer).
mod delete_messages;
mod history;
mod message_counts;
mod objects;
mod presence;
mod publish;
mod registry;
mod subscribe;

pub use delete_messages::*;
pub use history::*;
pub use message_counts::*;
pub use objects::*;
pub use presence::*;
pub use publish::*;
pub use registry::*;
pub use subscribe::*;

use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// Splits a top-level JSON array's elements by locating each element's
/// bounds in turn; no mutation of the buffer is needed since each element's
/// bounds are computed independently (unlike the original's NUL-splitting
/// strategy, which relied on a mutable buffer).
pub fn split_top_level_array(buf: &[u8], array: Elem) -> Result<alloc::vec::Vec<Elem>, PubNubError> {
    let mut out = alloc::vec::Vec::new();
    let mut i = json::skip_whitespace(buf, array.start, array.end);
    if i >= array.end || buf[i] != b'[' {
        return Err(PubNubError::new(ResultCode::FormatError, "expected array"));
    }
    i += 1;
    loop {
        i = json::skip_whitespace(buf, i, array.end);
        if i >= array.end {
            return Err(PubNubError::new(ResultCode::FormatError, "unterminated array"));
        }
        if buf[i] == b']' {
            return Ok(out);
        }
        let elem_end = json::find_end_element(buf, i, array.end);
        out.push(Elem::new(i, elem_end));
        i = json::skip_whitespace(buf, elem_end, array.end);
        if i >= array.end {
            return Err(PubNubError::new(ResultCode::FormatError, "unterminated array"));
        }
        match buf[i] {
            b']' => return Ok(out),
            b',' => i += 1,
            _ => return Err(PubNubError::new(ResultCode::FormatError, "expected , or ]")),
        }
    }
}

/// Scans for a `"status"` field holding `"403"` anywhere before shape
/// validation runs, so permission errors are never masked by a format
/// error (spec.md §7). Tolerant of whitespace around the colon, since this
/// runs before any shape is assumed.
pub fn is_access_denied(buf: &[u8]) -> bool {
    let mut search_from = 0;
    while let Some(rel) = find_subslice(&buf[search_from..], br#""status""#) {
        let key_pos = search_from + rel;
        let mut i = key_pos + br#""status""#.len();
        i = json::skip_whitespace(buf, i, buf.len());
        if i < buf.len() && buf[i] == b':' {
            i = json::skip_whitespace(buf, i + 1, buf.len());
            if buf[i..].starts_with(br#""403""#) {
                return true;
            }
        }
        search_from = key_pos + 1;
    }
    false
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}

/// Offsets into the reply buffer a caller can iterate without copying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Iterators {
    pub msg_ofs: usize,
    pub msg_end: usize,
    pub chan_ofs: usize,
    pub chan_end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_access_denied_before_shape_checks() {
        let buf = br#"{"status": "403", "message": "Forbidden"}"#;
        assert!(is_access_denied(buf));
    }

    #[test]
    fn splits_simple_array() {
        let buf = br#"[1, "two", [3]]"#;
        let elems = split_top_level_array(buf, Elem::new(0, buf.len())).unwrap();
        assert_eq!(elems.len(), 3);
        assert_eq!(elems[1].slice(buf), br#""two""#);
    }
}
