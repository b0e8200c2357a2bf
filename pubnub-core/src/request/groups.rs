use super::{finish, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;

pub struct ChannelGroupParams<'a> {
    pub subscribe_key: &'a str,
    pub group: &'a str,
    pub remove_group: bool,
    pub add_channels: &'a [&'a str],
    pub remove_channels: &'a [&'a str],
    pub auth: Option<&'a str>,
}

/// `/v1/channel-registration/sub-key/{sk}/channel-group/{group}[/remove]`.
pub fn build_channel_group(
    scratch: &mut Scratch<'_>,
    p: &ChannelGroupParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v1/channel-registration/sub-key/");
    path.push_str(p.subscribe_key);
    path.push_str("/channel-group/");
    path.push_str(p.group);
    if p.remove_group {
        path.push_str("/remove");
    }

    let mut q = QueryParams::new();
    if !p.add_channels.is_empty() {
        q.push("add", p.add_channels.join(","));
    }
    if !p.remove_channels.is_empty() {
        q.push("remove", p.remove_channels.join(","));
    }
    q.push_opt("auth", p.auth);
    finish(scratch, &path, q, signing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_add_and_remove_lists_with_commas() {
        let mut backing = [0u8; 256];
        let mut scratch = Scratch::new(&mut backing);
        let p = ChannelGroupParams {
            subscribe_key: "demo",
            group: "mygroup",
            remove_group: false,
            add_channels: &["a", "b"],
            remove_channels: &[],
            auth: None,
        };
        build_channel_group(&mut scratch, &p, None).unwrap();
        assert_eq!(
            scratch.as_str(),
            "/v1/channel-registration/sub-key/demo/channel-group/mygroup?add=a,b"
        );
    }
}
