use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// Delete-messages reply: object with `status:200` on success, or
/// `error:true` plus a `message` on failure (spec.md §4.C3).
#[derive(Debug, Clone, Copy)]
pub struct DeleteMessagesOutcome {
    pub status: Elem,
}

pub fn parse_delete_messages(buf: &[u8]) -> Result<DeleteMessagesOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "delete messages denied"));
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
        let message = json::get_object_value(buf, obj, "message")
            .map(|m| alloc::string::String::from(super::presence::strip_quotes(m.slice(buf))))
            .unwrap_or_default();
        return Err(PubNubError::new(ResultCode::FetchHistoryError, message));
    }
    let status = json::get_object_value(buf, obj, "status")
        .map_err(|_| PubNubError::new(ResultCode::FetchHistoryError, "missing status"))?;
    Ok(DeleteMessagesOutcome { status })
}
