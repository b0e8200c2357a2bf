use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// Channel-group registry reply: an object carrying `error` (bool), and on
/// success a `payload` field listing channels/groups (spec.md §4.C3).
#[derive(Debug, Clone, Copy)]
pub struct RegistryOutcome {
    pub payload: Elem,
}

pub fn parse_registry(buf: &[u8]) -> Result<RegistryOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "channel registry denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'{' {
        return Err(PubNubError::new(ResultCode::ChannelRegistryError, "expected object"));
    }
    let obj = Elem::new(i, json::find_end_complex(buf, i, end));
    let is_error = json::get_object_value(buf, obj, "error")
        .map(|e| e.slice(buf) != b"false")
        .unwrap_or(false);
    if is_error {
        let message = json::get_object_value(buf, obj, "message")
            .map(|m| alloc::string::String::from(super::presence::strip_quotes(m.slice(buf))))
            .unwrap_or_default();
        return Err(PubNubError::new(ResultCode::ChannelRegistryError, message));
    }
    let payload = json::get_object_value(buf, obj, "payload")
        .map_err(|_| PubNubError::new(ResultCode::ChannelRegistryError, "missing payload"))?;
    Ok(RegistryOutcome { payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_registry_reply_yields_payload() {
        let buf = br#"{"status":200,"error":false,"payload":{"channels":["a","b"]}}"#;
        let outcome = parse_registry(buf).unwrap();
        assert!(outcome.payload.slice(buf).starts_with(b"{"));
    }

    #[test]
    fn error_registry_reply_surfaces_message() {
        let buf = br#"{"status":400,"error":true,"message":"Group empty","payload":{}}"#;
        let err = parse_registry(buf).unwrap_err();
        assert_eq!(err.code(), ResultCode::ChannelRegistryError);
        assert_eq!(err.message(), "Group empty");
    }
}
