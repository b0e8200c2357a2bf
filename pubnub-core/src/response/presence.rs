use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

#[derive(Debug, Clone, Copy)]
pub struct PresenceOutcome {
    pub body: Elem,
}

/// Requires an outer `{...}`; `"status":"403"` → access denied; presence of
/// an `error` field → `PRESENCE_API_ERROR` (mapped here to
/// [`ResultCode::ServerError`] since the taxonomy has no dedicated presence
/// variant) with the server's `message` surfaced verbatim.
pub fn parse_presence(buf: &[u8]) -> Result<PresenceOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "presence denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'{' {
        return Err(PubNubError::new(ResultCode::FormatError, "expected object"));
    }
    let obj = Elem::new(i, json::find_end_complex(buf, i, end));
    if let Ok(err_field) = json::get_object_value(buf, obj, "error") {
        let message = json::get_object_value(buf, obj, "message")
            .map(|m| alloc::string::String::from(strip_quotes(m.slice(buf))))
            .unwrap_or_default();
        let _ = err_field;
        return Err(PubNubError::new(ResultCode::ServerError, message));
    }
    Ok(PresenceOutcome { body: obj })
}

pub(super) fn strip_quotes(s: &[u8]) -> &str {
    let s = core::str::from_utf8(s).unwrap_or("");
    s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToOwned;

    #[test]
    fn surfaces_error_message_verbatim() {
        let buf = br#"{"error": true, "message": "Channel missing"}"#;
        let err = parse_presence(buf).unwrap_err();
        assert_eq!(err.message(), "Channel missing");
    }

    #[test]
    fn ok_object_without_error_field() {
        let buf = br#"{"status": 200, "occupancy": 3}"#;
        assert!(parse_presence(buf).is_ok());
    }
}
