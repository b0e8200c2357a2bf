use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// History v2 reply shape: `[[msgs...], "start", "end"]`.
#[derive(Debug, Clone, Copy)]
pub struct HistoryV2Outcome {
    pub messages: Elem,
    pub start: Elem,
    pub end: Elem,
}

pub fn parse_history_v2(buf: &[u8]) -> Result<HistoryV2Outcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "history denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'[' {
        return Err(PubNubError::new(ResultCode::FetchHistoryError, "expected array"));
    }
    let array = Elem::new(i, json::find_end_complex(buf, i, end));
    let elems = super::split_top_level_array(buf, array)
        .map_err(|_| PubNubError::new(ResultCode::FetchHistoryError, "malformed history reply"))?;
    if elems.len() < 3 {
        return Err(PubNubError::new(ResultCode::FetchHistoryError, "incomplete history reply"));
    }
    Ok(HistoryV2Outcome {
        messages: elems[0],
        start: elems[1],
        end: elems[2],
    })
}

/// Fetch-history (v3) reply shape: an object keyed by channel, each holding
/// an array of message objects, per spec.md §4.C3.
#[derive(Debug, Clone, Copy)]
pub struct FetchHistoryOutcome {
    pub channels: Elem,
    pub more: Option<Elem>,
}

pub fn parse_fetch_history(buf: &[u8]) -> Result<FetchHistoryOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "fetch history denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'{' {
        return Err(PubNubError::new(ResultCode::FetchHistoryError, "expected object"));
    }
    let obj = Elem::new(i, json::find_end_complex(buf, i, end));
    if let Ok(err) = json::get_object_value(buf, obj, "error") {
        if err.slice(buf) != b"false" {
            return Err(PubNubError::new(ResultCode::FetchHistoryError, "server reported error"));
        }
    }
    let channels = json::get_object_value(buf, obj, "channels")
        .map_err(|_| PubNubError::new(ResultCode::FetchHistoryError, "missing channels"))?;
    let more = json::get_object_value(buf, obj, "more").ok();
    Ok(FetchHistoryOutcome { channels, more })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_v2_requires_three_elements() {
        let buf = br#"[["a","b"],"13608887014587700","13608887015807500"]"#;
        let outcome = parse_history_v2(buf).unwrap();
        assert_eq!(outcome.start.slice(buf), br#""13608887014587700""#);
    }

    #[test]
    fn history_v2_rejects_truncated_shape() {
        let buf = br#"[["a","b"]]"#;
        assert_eq!(parse_history_v2(buf).unwrap_err().code(), ResultCode::FetchHistoryError);
    }

    #[test]
    fn fetch_history_extracts_channels_object() {
        let buf = br#"{"status":200,"error":false,"channels":{"ch1":[{"message":"hi"}]}}"#;
        let outcome = parse_fetch_history(buf).unwrap();
        assert!(outcome.channels.slice(buf).starts_with(b"{"));
        assert!(outcome.more.is_none());
    }

    #[test]
    fn fetch_history_surfaces_server_error() {
        let buf = br#"{"status":400,"error":true,"channels":{}}"#;
        assert_eq!(parse_fetch_history(buf).unwrap_err().code(), ResultCode::FetchHistoryError);
    }
}
