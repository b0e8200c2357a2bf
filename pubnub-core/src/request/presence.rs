use super::{finish, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;

pub struct HereNowParams<'a> {
    pub subscribe_key: &'a str,
    pub channel: Option<&'a str>,
    pub channel_group: Option<&'a str>,
    pub disable_uuids: bool,
    pub include_state: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub uuid: Option<&'a str>,
    pub auth: Option<&'a str>,
}

/// `/v2/presence/sub-key/{sk}[/channel/{channel}]`.
pub fn build_here_now(
    scratch: &mut Scratch<'_>,
    p: &HereNowParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v2/presence/sub-key/");
    path.push_str(p.subscribe_key);
    if let Some(channel) = p.channel {
        path.push_str("/channel/");
        path.push_str(channel);
    }

    let mut q = QueryParams::new();
    q.push_opt("channel-group", p.channel_group);
    if p.disable_uuids {
        q.push("disable_uuids", "1");
    }
    if p.include_state {
        q.push("state", "1");
    }
    if let Some(limit) = p.limit {
        q.push("limit", alloc::format!("{limit}"));
    }
    if let Some(offset) = p.offset {
        q.push("offset", alloc::format!("{offset}"));
    }
    q.push_opt("uuid", p.uuid);
    q.push_opt("auth", p.auth);
    finish(scratch, &path, q, signing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_subkey_here_now_omits_channel_segment() {
        let mut backing = [0u8; 128];
        let mut scratch = Scratch::new(&mut backing);
        let p = HereNowParams {
            subscribe_key: "demo",
            channel: None,
            channel_group: None,
            disable_uuids: false,
            include_state: false,
            limit: None,
            offset: None,
            uuid: None,
            auth: None,
        };
        build_here_now(&mut scratch, &p, None).unwrap();
        assert_eq!(scratch.as_str(), "/v2/presence/sub-key/demo");
    }
}
