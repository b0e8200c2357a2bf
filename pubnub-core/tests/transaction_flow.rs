//! Cross-module scenarios that a single unit test can't cover: a request
//! built by `request::` decoded back out by `response::`, a subscribe
//! envelope split and walked message-by-message, DNS wire round trips that
//! must survive a hostile compression pointer, and the retry/endpoint-group
//! decision a failed transaction hands back to a caller.

use pubnub_core::dns;
use pubnub_core::error::ResultCode;
use pubnub_core::fsm::{Outcome, TransactionKind};
use pubnub_core::request::{self, PublishParams, Scratch};
use pubnub_core::response;
use pubnub_core::retry::{self, EndpointGroup, ExcludedGroups, RetryPolicy};
use pubnub_core::subscribe_v2::MessageCursor;

#[test]
fn publish_get_request_round_trips_through_the_canonical_response_shape() {
    let mut backing = [0u8; 256];
    let mut scratch = Scratch::new(&mut backing);
    let params = PublishParams {
        publish_key: "demo-pub",
        subscribe_key: "demo-sub",
        channel: "room-1",
        message_json: r#"{"text":"hi"}"#,
        store: true,
        uuid: Some("client-1"),
        auth: None,
        meta_json: None,
        ttl: None,
    };
    request::build_publish_get(&mut scratch, &params, None).unwrap();
    assert!(scratch.as_str().starts_with("/publish/demo-pub/demo-sub/0/room-1/0/"));
    assert!(scratch.as_str().contains("uuid=client-1"));

    // The server's reply to that request is independent of how we built it;
    // only the canonical `[1, "Sent", "<timetoken>"]` envelope matters here.
    let reply = br#"[1,"Sent","15212131415926793"]"#;
    let outcome = response::parse_publish(reply).unwrap();
    assert_eq!(outcome.timetoken.slice(reply), br#""15212131415926793""#);
}

#[test]
fn publish_get_reports_overflow_without_touching_response_parsing() {
    let mut backing = [0u8; 8];
    let mut scratch = Scratch::new(&mut backing);
    let params = PublishParams {
        publish_key: "demo-pub",
        subscribe_key: "demo-sub",
        channel: "room-1",
        message_json: r#"{"text":"hi"}"#,
        store: true,
        uuid: None,
        auth: None,
        meta_json: None,
        ttl: None,
    };
    let err = request::build_publish_get(&mut scratch, &params, None).unwrap_err();
    assert_eq!(err.code(), ResultCode::TxBufferTooSmall);
}

#[test]
fn subscribe_envelope_splits_into_walkable_message_records() {
    let body = br#"{"t":{"t":"15000","r":1},"m":[
        {"c":"room-1","d":{"text":"hi"},"p":{"t":"1","u":"abcd"}},
        {"c":"room-1","b":"group-1","d":"raw-payload","f":514,"e":1}
    ]}"#;
    let outer = pubnub_core::json::Elem::new(0, body.len());
    let messages_elem = pubnub_core::json::get_object_value(body, outer, "m").unwrap();
    let elems = response::split_top_level_array(body, messages_elem).unwrap();

    let mut cursor = MessageCursor::new(body, elems);
    let first = cursor.next_record().unwrap();
    assert_eq!(first.channel.slice(body), br#""room-1""#);
    assert!(first.subscription.is_none());

    let second = cursor.next_record().unwrap();
    assert_eq!(second.subscription.unwrap().slice(body), br#""group-1""#);
    assert_eq!(second.flags, Some(514));

    assert!(cursor.next_record().is_none());
}

#[test]
fn dns_round_trip_survives_a_hostile_compression_pointer() {
    let mut query_buf = [0u8; 64];
    let len = dns::encode_query("pubsub.pubnub.com", 0x1234, &mut query_buf).unwrap();
    assert!(len > 12, "query must include the 12-byte header plus a name");

    // Build a minimal response: header claiming 1 question / 1 answer, the
    // question restated, then an answer whose name is a compression pointer
    // back to the question — this is the common case real resolvers send,
    // not the adversarial forward-pointer cycle (covered in dns.rs's own
    // unit tests).
    let mut resp = alloc_response_header();
    resp.extend_from_slice(&query_buf[12..len]); // restated question
    resp.extend_from_slice(&[0xc0, 0x0c]); // pointer to offset 12 (the question name)
    resp.extend_from_slice(&[0x00, 0x01]); // TYPE A
    resp.extend_from_slice(&[0x00, 0x01]); // CLASS IN
    resp.extend_from_slice(&[0x00, 0x00, 0x00, 0x3c]); // TTL 60
    resp.extend_from_slice(&[0x00, 0x04]); // RDLENGTH 4
    resp.extend_from_slice(&[203, 0, 113, 7]); // RDATA

    let pool = dns::decode_response(&resp).unwrap();
    assert_eq!(pool.first_ipv4, Some([203, 0, 113, 7]));
}

fn alloc_response_header() -> Vec<u8> {
    let mut h = Vec::with_capacity(12);
    h.extend_from_slice(&[0x12, 0x34]); // id, matches the query above
    h.extend_from_slice(&[0x81, 0x80]); // QR=1, RA=1, rcode=0
    h.extend_from_slice(&[0x00, 0x01]); // QDCOUNT=1
    h.extend_from_slice(&[0x00, 0x01]); // ANCOUNT=1
    h.extend_from_slice(&[0x00, 0x00]); // NSCOUNT=0
    h.extend_from_slice(&[0x00, 0x00]); // ARCOUNT=0
    h
}

#[test]
fn excluded_endpoint_group_suppresses_retry_regardless_of_attempt_count() {
    let excluded = ExcludedGroups::none().union(ExcludedGroups::PUBLISH);
    let delay = retry::next_delay_ms(
        RetryPolicy::linear_default(),
        EndpointGroup::Publish,
        excluded,
        1,
        None,
        7,
    );
    assert_eq!(delay, None);
}

#[test]
fn retry_after_header_overrides_the_computed_backoff() {
    let delay = retry::next_delay_ms(
        RetryPolicy::exponential_default(),
        EndpointGroup::Subscribe,
        ExcludedGroups::none(),
        3,
        Some(5),
        42,
    );
    assert_eq!(delay, Some(5000));
}

#[test]
fn a_terminal_http_error_outcome_is_retryable_through_the_same_policy_path() {
    let outcome = Outcome {
        kind: TransactionKind::Subscribe,
        code: ResultCode::HttpError,
        http_status: 500,
    };
    assert!(retry::is_retryable(outcome.code, outcome.http_status));
    let delay = retry::next_delay_ms(
        RetryPolicy::linear_default(),
        outcome.kind.endpoint_group(),
        ExcludedGroups::none(),
        1,
        None,
        1,
    );
    assert!(delay.is_some());
}
