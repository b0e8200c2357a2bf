use super::{finish, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;

pub struct SubscribeParams<'a> {
    pub subscribe_key: &'a str,
    pub channel: &'a str,
    pub timetoken: &'a str,
    pub channel_group: Option<&'a str>,
    pub uuid: Option<&'a str>,
    pub auth: Option<&'a str>,
    pub heartbeat: Option<u32>,
}

/// `/subscribe/{sk}/{channel}/0/{timetoken}` — the v1 long-poll form.
pub fn build_subscribe(
    scratch: &mut Scratch<'_>,
    p: &SubscribeParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/subscribe/");
    path.push_str(p.subscribe_key);
    path.push('/');
    path.push_str(p.channel);
    path.push_str("/0/");
    path.push_str(p.timetoken);

    let mut q = QueryParams::new();
    q.push_opt("channel-group", p.channel_group);
    q.push_opt("uuid", p.uuid);
    q.push_opt("auth", p.auth);
    if let Some(hb) = p.heartbeat {
        q.push("heartbeat", alloc::format!("{hb}"));
    }
    finish(scratch, &path, q, signing)
}

pub struct SubscribeV2Params<'a> {
    pub subscribe_key: &'a str,
    pub channel: &'a str,
    pub timetoken: &'a str,
    pub region: Option<&'a str>,
    pub channel_group: Option<&'a str>,
    pub uuid: Option<&'a str>,
    pub auth: Option<&'a str>,
    pub heartbeat: Option<u32>,
    pub filter_expr: Option<&'a str>,
}

/// `/v2/subscribe/{sk}/{channel}/0` with `tt`/`tr`/`filter-expr`.
pub fn build_subscribe_v2(
    scratch: &mut Scratch<'_>,
    p: &SubscribeV2Params<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v2/subscribe/");
    path.push_str(p.subscribe_key);
    path.push('/');
    path.push_str(p.channel);
    path.push_str("/0");

    let mut q = QueryParams::new();
    q.push("tt", p.timetoken);
    q.push_opt("tr", p.region);
    q.push_opt("channel-group", p.channel_group);
    q.push_opt("uuid", p.uuid);
    q.push_opt("auth", p.auth);
    q.push_opt("filter-expr", p.filter_expr);
    if let Some(hb) = p.heartbeat {
        q.push("heartbeat", alloc::format!("{hb}"));
    }
    finish(scratch, &path, q, signing)
}

/// `/v2/presence/sub-key/{sk}/channel/{channel}/leave`.
pub fn build_leave(
    scratch: &mut Scratch<'_>,
    subscribe_key: &str,
    channel: &str,
    channel_group: Option<&str>,
    uuid: Option<&str>,
    auth: Option<&str>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v2/presence/sub-key/");
    path.push_str(subscribe_key);
    path.push_str("/channel/");
    path.push_str(channel);
    path.push_str("/leave");

    let mut q = QueryParams::new();
    q.push_opt("channel-group", channel_group);
    q.push_opt("uuid", uuid);
    q.push_opt("auth", auth);
    finish(scratch, &path, q, signing)
}
