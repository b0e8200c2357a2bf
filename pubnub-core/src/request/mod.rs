//! Request builder — C2.
//!
//! Formats one outbound HTTP request (path + query string, optionally a
//! body) into a caller-owned scratch buffer. Grounded on the teacher's
//! `codec::encoder` shape (a builder that accumulates into a borrowed
//! buffer and reports a typed overflow error rather than panicking or
//! growing unbounded) generalized to the per-operation URL/query shapes
//! spec.md §4.C2 enumerates.
mod actions;
mod groups;
mod history;
mod objects;
mod pam;
mod presence;
mod publish;
mod subscribe;

pub use actions::*;
pub use groups::*;
pub use history::*;
pub use objects::*;
pub use pam::*;
pub use presence::*;
pub use publish::*;
pub use subscribe::*;

use crate::error::{PubNubError, ResultCode};
use crate::percent;
use alloc::string::String;
use alloc::vec::Vec;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HTTP method a request is sent with. `PostGzip` is `Post` with a
/// `Content-Encoding: gzip` body, kept distinct so the FSM knows to run the
/// compression-ratio heuristic (spec.md §6) before choosing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    PostGzip,
    Patch,
    Delete,
}

/// An ordered, append-only query parameter list. Order is insertion order
/// unless signing is requested, in which case [`Scratch::finish`] sorts the
/// parameters lexicographically before composing the URL, per spec.md §4.C2.
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn push(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key, value.into()));
        self
    }

    pub fn push_opt(&mut self, key: &'static str, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(v) = value {
            self.push(key, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Credentials needed to optionally sign a request. When `secret_key` is
/// `Some`, the builder sorts query parameters, adds a `timestamp`, and
/// replaces (or sets) `auth` with an HMAC-SHA256 signature over the
/// canonical string, per spec.md §4.C2.
pub struct SigningContext<'a> {
    pub publish_key: &'a str,
    pub subscribe_key: &'a str,
    pub secret_key: Option<&'a str>,
    pub auth_token: Option<&'a str>,
    pub now_unix_secs: u64,
}

/// A bounded, caller-owned output buffer the request builder writes into.
///
/// Mirrors the original C SDK's fixed scratch buffer: writes past capacity
/// do not panic, they stop and report [`ResultCode::TxBufferTooSmall`],
/// leaving `len()` at the last complete write (spec.md §3 invariant).
pub struct Scratch<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> Scratch<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), PubNubError> {
        let bytes = s.as_bytes();
        if self.len + bytes.len() > self.buf.len() {
            return Err(PubNubError::new(
                ResultCode::TxBufferTooSmall,
                "request exceeds scratch buffer capacity",
            ));
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    pub fn write_encoded(&mut self, s: &str) -> Result<(), PubNubError> {
        let encoded = percent::encode(s);
        self.write_str(&encoded)
    }
}

/// Writes `path` verbatim, then the query string (percent-encoded values),
/// applying signing if `signing` carries a secret key. This is the single
/// place every per-operation builder in this module funnels through.
pub fn finish(
    scratch: &mut Scratch<'_>,
    path: &str,
    mut query: QueryParams,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    scratch.write_str(path)?;

    if let Some(sign) = signing {
        if let Some(secret) = sign.secret_key {
            query.push("timestamp", alloc::format!("{}", sign.now_unix_secs));
            if let Some(auth) = sign.auth_token {
                query.push("auth", auth);
            }
            query.pairs.sort_by(|a, b| a.0.cmp(b.0));
            let canonical = canonical_string(path, &query);
            let signature = sign_hmac_sha256(secret, &canonical);
            // The signature supersedes any inline `auth` value once signing
            // is active (spec.md §4.C2).
            query.pairs.retain(|(k, _)| *k != "signature");
            query.pairs.push(("signature", signature));
        }
    }

    if query.is_empty() {
        return Ok(());
    }
    scratch.write_str("?")?;
    for (i, (key, value)) in query.pairs.iter().enumerate() {
        if i > 0 {
            scratch.write_str("&")?;
        }
        scratch.write_str(key)?;
        scratch.write_str("=")?;
        scratch.write_encoded(value)?;
    }
    Ok(())
}

fn canonical_string(path: &str, query: &QueryParams) -> String {
    let mut s = String::new();
    s.push_str(path);
    s.push('\n');
    for (i, (key, value)) in query.pairs.iter().enumerate() {
        if i > 0 {
            s.push('&');
        }
        s.push_str(key);
        s.push('=');
        s.push_str(value);
    }
    s
}

fn sign_hmac_sha256(secret: &str, canonical: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(canonical.as_bytes());
    let digest = mac.finalize().into_bytes();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_tx_buffer_too_small() {
        let mut backing = [0u8; 4];
        let mut scratch = Scratch::new(&mut backing);
        let err = scratch.write_str("too long").unwrap_err();
        assert_eq!(err.code(), ResultCode::TxBufferTooSmall);
        assert_eq!(scratch.len(), 0);
    }

    #[test]
    fn signing_sorts_params_and_adds_signature() {
        let mut backing = [0u8; 512];
        let mut scratch = Scratch::new(&mut backing);
        let mut q = QueryParams::new();
        q.push("uuid", "bob");
        let signing = SigningContext {
            publish_key: "demo",
            subscribe_key: "demo",
            secret_key: Some("sec"),
            auth_token: None,
            now_unix_secs: 1000,
        };
        finish(&mut scratch, "/publish/demo/demo/0/chan/0", q, Some(&signing)).unwrap();
        assert!(scratch.as_str().contains("signature="));
        assert!(scratch.as_str().contains("timestamp=1000"));
    }
}
