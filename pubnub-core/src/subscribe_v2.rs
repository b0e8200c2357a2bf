//! Subscribe-v2 envelope decoder — C8.
//!
//! Decodes the `{"t":{...},"m":[...]}` envelope one message at a time from a
//! cursor into the `m` array, rather than collecting every message up
//! front — grounded on `pubnub_subscribe_v2_message.h` from the original C
//! SDK (notes taken before the retrieval pack was lost — see DESIGN.md),
//! which exposes the same per-message field set through a cursor-based
//! `pbcc_parse_messages` loop.
use crate::json::{self, Elem};

/// `e` (message type) values per spec.md §4.C8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Signal,
    Published,
    Action,
    Objects,
    Files,
    Unknown(u32),
}

impl MessageType {
    fn from_code(code: u32) -> Self {
        match code {
            1 => MessageType::Signal,
            2 => MessageType::Published,
            3 => MessageType::Action,
            4 => MessageType::Objects,
            5 => MessageType::Files,
            other => MessageType::Unknown(other),
        }
    }
}

/// One decoded element of `m`. Every string-shaped field stays an [`Elem`]
/// range into the caller's reply buffer; nothing here copies.
#[derive(Debug, Clone, Copy)]
pub struct MessageRecord {
    pub channel: Elem,
    pub subscription: Option<Elem>,
    pub payload: Elem,
    pub metadata: Option<Elem>,
    pub publish_timetoken: Option<Elem>,
    pub publisher: Option<Elem>,
    pub flags: Option<u32>,
    pub message_type: MessageType,
    pub custom_type: Option<Elem>,
}

/// Walks the `m` array one element at a time. Constructed over the already
/// top-level-split array (see [`crate::response::split_top_level_array`])
/// so it never needs to know the reply's outer envelope shape.
pub struct MessageCursor<'a> {
    buf: &'a [u8],
    elems: alloc::vec::Vec<Elem>,
    next: usize,
}

impl<'a> MessageCursor<'a> {
    pub fn new(buf: &'a [u8], elems: alloc::vec::Vec<Elem>) -> Self {
        Self { buf, elems, next: 0 }
    }

    /// Returns the next decoded record, or `None` once every element of `m`
    /// has been consumed (spec.md §4.C8: "an empty record marks end of
    /// stream").
    pub fn next_record(&mut self) -> Option<MessageRecord> {
        if self.next >= self.elems.len() {
            return None;
        }
        let obj = self.elems[self.next];
        self.next += 1;
        decode_message(self.buf, obj).ok()
    }
}

fn decode_message(buf: &[u8], obj: Elem) -> Result<MessageRecord, ()> {
    let channel = json::get_object_value(buf, obj, "c").map_err(|_| ())?;
    let payload = json::get_object_value(buf, obj, "d").map_err(|_| ())?;
    let subscription = json::get_object_value(buf, obj, "b").ok();
    let metadata = json::get_object_value(buf, obj, "u").ok();
    let custom_type = json::get_object_value(buf, obj, "cmt").ok();

    let publish_timetoken = json::get_object_value(buf, obj, "p")
        .ok()
        .and_then(|p| json::get_object_value(buf, p, "t").ok());
    let publisher = json::get_object_value(buf, obj, "p")
        .ok()
        .and_then(|p| json::get_object_value(buf, p, "u").ok());

    let flags = json::get_object_value(buf, obj, "f")
        .ok()
        .and_then(|e| parse_u32(e.slice(buf)));

    let message_type = json::get_object_value(buf, obj, "e")
        .ok()
        .and_then(|e| parse_u32(e.slice(buf)))
        .map(MessageType::from_code)
        .unwrap_or(MessageType::Published);

    Ok(MessageRecord {
        channel,
        subscription,
        payload,
        metadata,
        publish_timetoken,
        publisher,
        flags,
        message_type,
        custom_type,
    })
}

fn parse_u32(bytes: &[u8]) -> Option<u32> {
    core::str::from_utf8(bytes).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::split_top_level_array;

    #[test]
    fn decodes_minimal_message() {
        let buf = br#"[{"c":"ch1","d":{"text":"hi"}}]"#;
        let array = Elem::new(0, buf.len());
        let elems = split_top_level_array(buf, array).unwrap();
        let mut cursor = MessageCursor::new(buf, elems);
        let rec = cursor.next_record().unwrap();
        assert_eq!(rec.channel.slice(buf), br#""ch1""#);
        assert_eq!(rec.message_type, MessageType::Published);
        assert!(cursor.next_record().is_none());
    }

    #[test]
    fn decodes_full_field_set() {
        let buf = br#"[{"c":"ch1","b":"cg1","d":"payload","u":{"k":1},"p":{"t":"123","u":"pub1"},"f":514,"e":1,"cmt":3}]"#;
        let array = Elem::new(0, buf.len());
        let elems = split_top_level_array(buf, array).unwrap();
        let mut cursor = MessageCursor::new(buf, elems);
        let rec = cursor.next_record().unwrap();
        assert_eq!(rec.subscription.unwrap().slice(buf), br#""cg1""#);
        assert_eq!(rec.publish_timetoken.unwrap().slice(buf), br#""123""#);
        assert_eq!(rec.publisher.unwrap().slice(buf), br#""pub1""#);
        assert_eq!(rec.flags, Some(514));
        assert_eq!(rec.message_type, MessageType::Signal);
        assert_eq!(rec.custom_type.unwrap().slice(buf), b"3");
    }

    #[test]
    fn iterates_multiple_messages_in_order() {
        let buf = br#"[{"c":"a","d":1},{"c":"b","d":2}]"#;
        let array = Elem::new(0, buf.len());
        let elems = split_top_level_array(buf, array).unwrap();
        let mut cursor = MessageCursor::new(buf, elems);
        assert_eq!(cursor.next_record().unwrap().channel.slice(buf), br#""a""#);
        assert_eq!(cursor.next_record().unwrap().channel.slice(buf), br#""b""#);
        assert!(cursor.next_record().is_none());
    }
}
