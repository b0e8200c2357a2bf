use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// `[1, "Sent", "<timetoken>"]` on success; any other shape — including a
/// bare JSON object, which some error responses send instead of an array —
/// is `PUBLISH_FAILED` with the raw body kept for the "last publish result"
/// accessor (spec.md §4.C3, §7).
#[derive(Debug, Clone, Copy)]
pub struct PublishOutcome {
    pub timetoken: Elem,
}

pub fn parse_publish(buf: &[u8]) -> Result<PublishOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "publish denied"));
    }
    let end = buf.len();
    let mut i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'[' {
        // A JSON object (or anything non-array) means the server rejected
        // the publish outright; no further parsing is attempted.
        return Err(publish_failed(buf));
    }
    let array = Elem::new(i, json::find_end_complex(buf, i, end));
    let elems = super::split_top_level_array(buf, array)?;
    if elems.len() < 2 {
        return Err(publish_failed(buf));
    }
    let first_ok = elems[0].slice(buf) == b"1";
    if !first_ok {
        return Err(publish_failed(buf));
    }
    let timetoken = elems.get(2).copied().unwrap_or(elems[1]);
    let _ = i;
    Ok(PublishOutcome { timetoken })
}

fn publish_failed(buf: &[u8]) -> PubNubError {
    let body = core::str::from_utf8(buf).unwrap_or("<non-utf8 body>");
    PubNubError::new(ResultCode::PublishFailed, alloc::string::String::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_success_shape() {
        let buf = br#"[1,"Sent","15212131415926793"]"#;
        let outcome = parse_publish(buf).unwrap();
        assert_eq!(outcome.timetoken.slice(buf), br#""15212131415926793""#);
    }

    #[test]
    fn object_body_is_publish_failed_with_body_preserved() {
        let buf = br#"{"message": "Invalid JSON"}"#;
        let err = parse_publish(buf).unwrap_err();
        assert_eq!(err.code(), ResultCode::PublishFailed);
        assert!(err.message().contains("Invalid JSON"));
    }

    #[test]
    fn zero_leading_element_is_publish_failed() {
        let buf = br#"[0,"Some reason"]"#;
        let err = parse_publish(buf).unwrap_err();
        assert_eq!(err.code(), ResultCode::PublishFailed);
    }
}
