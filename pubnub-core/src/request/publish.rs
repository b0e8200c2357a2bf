use super::{finish, Method, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use crate::gzip::{should_compress, MIN_COMPRESSION_RATIO};
use alloc::string::String;

/// Parameters shared by the three publish wire shapes (GET, POST,
/// POST+gzip) from spec.md §4.C2.
pub struct PublishParams<'a> {
    pub publish_key: &'a str,
    pub subscribe_key: &'a str,
    pub channel: &'a str,
    /// JSON-encoded message body. For the GET form this is percent-encoded
    /// directly into the path; for POST forms the caller sends this as the
    /// request body (not written into `scratch`).
    pub message_json: &'a str,
    pub store: bool,
    pub uuid: Option<&'a str>,
    pub auth: Option<&'a str>,
    pub meta_json: Option<&'a str>,
    pub ttl: Option<u32>,
}

/// Chooses GET vs POST vs POST+gzip for a publish, applying the named
/// compression-ratio constant from spec.md §6 rather than hard-coding the
/// threshold at each call site (spec.md §9 design note).
pub fn choose_publish_method(message_json: &str, compressed_len: Option<usize>) -> Method {
    match compressed_len {
        Some(compressed) if should_compress(message_json.len(), compressed) => Method::PostGzip,
        _ => Method::Post,
    }
}

pub fn build_publish_get(
    scratch: &mut Scratch<'_>,
    p: &PublishParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/publish/");
    path.push_str(p.publish_key);
    path.push('/');
    path.push_str(p.subscribe_key);
    path.push_str("/0/");
    path.push_str(p.channel);
    path.push_str("/0/");
    let encoded_message = crate::percent::encode(p.message_json);
    path.push_str(&encoded_message);

    let mut q = build_common_query(p);
    let _ = &mut q;
    finish(scratch, &path, q, signing)
}

pub fn build_publish_post(
    scratch: &mut Scratch<'_>,
    p: &PublishParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/publish/");
    path.push_str(p.publish_key);
    path.push('/');
    path.push_str(p.subscribe_key);
    path.push_str("/0/");
    path.push_str(p.channel);
    path.push_str("/0");

    let q = build_common_query(p);
    finish(scratch, &path, q, signing)
}

fn build_common_query(p: &PublishParams<'_>) -> QueryParams {
    let mut q = QueryParams::new();
    if !p.store {
        q.push("store", "0");
    }
    q.push_opt("uuid", p.uuid);
    q.push_opt("auth", p.auth);
    q.push_opt("meta", p.meta_json);
    if let Some(ttl) = p.ttl {
        q.push("ttl", alloc::format!("{ttl}"));
    }
    q
}
