use super::is_access_denied;
use crate::error::{PubNubError, ResultCode};
use crate::json::{self, Elem};

/// Objects-API reply: an object carrying either a single `data` object (by
/// id) or an array (collection list), plus optional pagination cursors
/// (spec.md §4.C3).
#[derive(Debug, Clone, Copy)]
pub struct ObjectsOutcome {
    pub data: Elem,
    pub next: Option<Elem>,
    pub prev: Option<Elem>,
}

pub fn parse_objects(buf: &[u8]) -> Result<ObjectsOutcome, PubNubError> {
    if is_access_denied(buf) {
        return Err(PubNubError::new(ResultCode::AccessDenied, "objects api denied"));
    }
    let end = buf.len();
    let i = json::skip_whitespace(buf, 0, end);
    if i >= end || buf[i] != b'{' {
        return Err(PubNubError::new(ResultCode::ObjectsApiError, "expected object"));
    }
    let obj = Elem::new(i, json::find_end_complex(buf, i, end));
    if let Ok(err) = json::get_object_value(buf, obj, "error") {
        let message = json::get_object_value(buf, err, "message")
            .map(|m| alloc::string::String::from(super::presence::strip_quotes(m.slice(buf))))
            .unwrap_or_default();
        return Err(PubNubError::new(ResultCode::ObjectsApiError, message));
    }
    let data = json::get_object_value(buf, obj, "data")
        .map_err(|_| PubNubError::new(ResultCode::ObjectsApiError, "missing data"))?;
    let next = json::get_object_value(buf, obj, "next").ok();
    let prev = json::get_object_value(buf, obj, "prev").ok();
    Ok(ObjectsOutcome { data, next, prev })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_reply() {
        let buf = br#"{"status":200,"data":{"id":"bob","name":"Bob"}}"#;
        let outcome = parse_objects(buf).unwrap();
        assert!(outcome.data.slice(buf).starts_with(b"{"));
        assert!(outcome.next.is_none());
    }

    #[test]
    fn collection_reply_with_cursors() {
        let buf = br#"{"status":200,"data":[{"id":"a"}],"next":"cursor1","prev":"cursor0"}"#;
        let outcome = parse_objects(buf).unwrap();
        assert_eq!(outcome.next.unwrap().slice(buf), br#""cursor1""#);
    }

    #[test]
    fn error_object_surfaces_message() {
        let buf = br#"{"status":404,"error":{"message":"Not found"}}"#;
        let err = parse_objects(buf).unwrap_err();
        assert_eq!(err.message(), "Not found");
    }
}
