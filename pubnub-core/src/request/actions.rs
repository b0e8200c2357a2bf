use super::{finish, Method, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;

pub struct ActionsParams<'a> {
    pub subscribe_key: &'a str,
    pub channel: &'a str,
    pub message_timetoken: Option<&'a str>,
    pub action_timetoken: Option<&'a str>,
    pub method: Method,
    pub auth: Option<&'a str>,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub limit: Option<u32>,
}

/// `/v1/message-actions/{sk}/channel/{channel}[/message/{mt}[/action/{at}]]`.
pub fn build_actions(
    scratch: &mut Scratch<'_>,
    p: &ActionsParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v1/message-actions/");
    path.push_str(p.subscribe_key);
    path.push_str("/channel/");
    path.push_str(p.channel);
    if let Some(mt) = p.message_timetoken {
        path.push_str("/message/");
        path.push_str(mt);
        if let Some(at) = p.action_timetoken {
            path.push_str("/action/");
            path.push_str(at);
        }
    }

    let mut q = QueryParams::new();
    q.push_opt("auth", p.auth);
    q.push_opt("start", p.start);
    q.push_opt("end", p.end);
    if let Some(limit) = p.limit {
        q.push("limit", alloc::format!("{limit}"));
    }
    finish(scratch, &path, q, signing)
}
