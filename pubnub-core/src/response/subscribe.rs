use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// Accepted shapes, from the most- to least-decorated, per spec.md §4.C3:
/// `[[msgs],"tt"]`, `[[msgs],"tt","channels"]`, `[[msgs],"tt","groups","channels"]`.
#[derive(Debug, Clone, Copy)]
pub struct SubscribeOutcome {
    pub messages: Elem,
    pub timetoken: Elem,
    pub groups: Option<Elem>,
    pub channels: Option<Elem>,
}

/// A dedicated failure kind per spec.md §4.C3 so callers can tell a missing
/// timetoken from a malformed one from a wholly unrecognized shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeParseError {
    Format,
    TimetokenFormat,
    NoTimetoken,
}

impl From<SubscribeParseError> for PubNubError {
    fn from(e: SubscribeParseError) -> Self {
        let code = match e {
            SubscribeParseError::Format => ResultCode::FormatError,
            SubscribeParseError::TimetokenFormat => ResultCode::SubscribeTimetokenFormatError,
            SubscribeParseError::NoTimetoken => ResultCode::NoTimetoken,
        };
        PubNubError::new(code, "subscribe response parse error")
    }
}

/// Maximum plausible timetoken length (17 ASCII digits covers a 64-bit
/// 100ns-tick value with headroom); anything longer is rejected as a
/// format error rather than accepted and later mis-parsed downstream.
const MAX_TIMETOKEN_LEN: usize = 20;

pub fn parse_subscribe(buf: &[u8]) -> Result<SubscribeOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "subscribe denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'[' {
        return Err(SubscribeParseError::Format.into());
    }
    let array = Elem::new(i, json::find_end_complex(buf, i, end));
    let elems = super::split_top_level_array(buf, array).map_err(|_| SubscribeParseError::Format)?;

    if elems.is_empty() {
        return Err(SubscribeParseError::Format.into());
    }
    let messages = elems[0];
    if messages.slice(buf).first().copied() != Some(b'[') {
        return Err(SubscribeParseError::Format.into());
    }

    let rest = &elems[1..];
    let (timetoken, groups, channels) = match rest.len() {
        0 => return Err(SubscribeParseError::NoTimetoken.into()),
        1 => (rest[0], None, None),
        2 => (rest[0], None, Some(rest[1])),
        _ => (rest[0], Some(rest[1]), Some(rest[2])),
    };

    validate_timetoken(buf, timetoken)?;

    Ok(SubscribeOutcome {
        messages,
        timetoken,
        groups,
        channels,
    })
}

fn validate_timetoken(buf: &[u8], tt: Elem) -> Result<(), SubscribeParseError> {
    let s = tt.slice(buf);
    if s.len() < 2 || s[0] != b'"' || s[s.len() - 1] != b'"' {
        return Err(SubscribeParseError::TimetokenFormat);
    }
    let digits = &s[1..s.len() - 1];
    if digits.is_empty() || digits.len() > MAX_TIMETOKEN_LEN || !digits.iter().all(u8::is_ascii_digit) {
        return Err(SubscribeParseError::TimetokenFormat);
    }
    Ok(())
}

/// `"0"`, the timetoken value a fatal parse failure resets to so the next
/// subscribe re-joins from the present (spec.md §3 invariant 4, §7).
pub const RESET_TIMETOKEN: &str = "0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_shape_without_channels_or_groups() {
        let buf = br#"[[],"15212131415926793"]"#;
        let outcome = parse_subscribe(buf).unwrap();
        assert!(outcome.channels.is_none());
        assert!(outcome.groups.is_none());
    }

    #[test]
    fn shape_with_channels_only() {
        let buf = br#"[[],"15212131415926793","chan1,chan2"]"#;
        let outcome = parse_subscribe(buf).unwrap();
        assert!(outcome.groups.is_none());
        assert_eq!(outcome.channels.unwrap().slice(buf), br#""chan1,chan2""#);
    }

    #[test]
    fn shape_with_groups_and_channels() {
        let buf = br#"[[],"15212131415926793","group1","chan1"]"#;
        let outcome = parse_subscribe(buf).unwrap();
        assert_eq!(outcome.groups.unwrap().slice(buf), br#""group1""#);
        assert_eq!(outcome.channels.unwrap().slice(buf), br#""chan1""#);
    }

    #[test]
    fn rejects_non_numeric_timetoken() {
        let buf = br#"[[],"abc"]"#;
        let err = parse_subscribe(buf).unwrap_err();
        assert_eq!(err.code(), ResultCode::SubscribeTimetokenFormatError);
    }

    #[test]
    fn missing_timetoken_is_distinct_error() {
        let buf = br#"[[]]"#;
        let err = parse_subscribe(buf).unwrap_err();
        assert_eq!(err.code(), ResultCode::NoTimetoken);
    }

    #[test]
    fn one_message_iterates_once() {
        let buf = br#"[["ping"],"15212131415926793"]"#;
        let outcome = parse_subscribe(buf).unwrap();
        let msgs = super::super::split_top_level_array(buf, outcome.messages).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].slice(buf), br#""ping""#);
    }
}
