use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// Message-counts reply: object with `error:false` and a `channels` object
/// mapping channel name to message count (spec.md §4.C3).
#[derive(Debug, Clone, Copy)]
pub struct MessageCountsOutcome {
    pub channels: Elem,
}

pub fn parse_message_counts(buf: &[u8]) -> Result<MessageCountsOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "message counts denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'{' {
        return Err(PubNubError::new(ResultCode::FetchHistoryError, "expected object"));
    }
    let obj = Elem::new(i, json::find_end_complex(buf, i, end));
    let is_error = json::get_object_value(buf, obj, "error")
        .map(|e| e.slice(buf) != b"false")
        .unwrap_or(false);
    if is_error {
        return Err(PubNubError::new(ResultCode::FetchHistoryError, "server reported error"));
    }
    let channels = json::get_object_value(buf, obj, "channels")
        .map_err(|_| PubNubError::new(ResultCode::FetchHistoryError, "missing channels"))?;
    Ok(MessageCountsOutcome { channels })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_per_channel_counts() {
        let buf = br#"{"status":200,"error":false,"channels":{"ch1":5,"ch2":0}}"#;
        let outcome = parse_message_counts(buf).unwrap();
        assert_eq!(outcome.channels.slice(buf), br#"{"ch1":5,"ch2":0}"#);
    }

    #[test]
    fn server_error_is_surfaced() {
        let buf = br#"{"status":400,"error":true,"channels":{}}"#;
        assert_eq!(parse_message_counts(buf).unwrap_err().code(), ResultCode::FetchHistoryError);
    }
}
