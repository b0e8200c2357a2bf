use super::{finish, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;
use alloc::vec::Vec;

pub struct HistoryV2Params<'a> {
    pub subscribe_key: &'a str,
    pub channel: &'a str,
    pub count: Option<u32>,
    pub include_token: bool,
    pub string_token: bool,
    pub reverse: bool,
    pub include_meta: bool,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub auth: Option<&'a str>,
}

/// `/v2/history/sub-key/{sk}/channel/{channel}`.
pub fn build_history_v2(
    scratch: &mut Scratch<'_>,
    p: &HistoryV2Params<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v2/history/sub-key/");
    path.push_str(p.subscribe_key);
    path.push_str("/channel/");
    path.push_str(p.channel);

    let mut q = QueryParams::new();
    if let Some(count) = p.count {
        q.push("count", alloc::format!("{count}"));
    }
    if p.include_token {
        q.push("include_token", "true");
    }
    if p.string_token {
        q.push("stringtoken", "true");
    }
    if p.reverse {
        q.push("reverse", "true");
    }
    if p.include_meta {
        q.push("include_meta", "true");
    }
    q.push_opt("start", p.start);
    q.push_opt("end", p.end);
    q.push_opt("auth", p.auth);
    finish(scratch, &path, q, signing)
}

pub struct FetchHistoryParams<'a> {
    pub subscribe_key: &'a str,
    pub channels: &'a [&'a str],
    pub include_meta: bool,
    pub include_message_type: bool,
    pub include_user_id: bool,
    pub include_message_actions: bool,
    pub reverse: bool,
    pub max_per_channel: Option<u32>,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub auth: Option<&'a str>,
}

/// Default `max` per spec.md §4.C2: 25 when actions or multiple channels
/// are requested, else 100.
pub fn default_max_per_channel(channel_count: usize, include_message_actions: bool) -> u32 {
    if include_message_actions || channel_count > 1 {
        25
    } else {
        100
    }
}

/// Fetch-history, multi-channel: `/v3/history/sub-key/{sk}/channel/{channels}`.
pub fn build_fetch_history(
    scratch: &mut Scratch<'_>,
    p: &FetchHistoryParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v3/history/sub-key/");
    path.push_str(p.subscribe_key);
    path.push_str("/channel/");
    path.push_str(&join_channels(p.channels));

    let max = p
        .max_per_channel
        .unwrap_or_else(|| default_max_per_channel(p.channels.len(), p.include_message_actions));

    let mut q = QueryParams::new();
    if p.include_meta {
        q.push("include_meta", "true");
    }
    if p.include_message_type {
        q.push("include_message_type", "true");
    }
    if p.include_user_id {
        q.push("include_user_id", "true");
    }
    if p.include_message_actions {
        q.push("include_message_actions", "true");
    }
    if p.reverse {
        q.push("reverse", "true");
    }
    q.push("max", alloc::format!("{max}"));
    q.push_opt("start", p.start);
    q.push_opt("end", p.end);
    q.push_opt("auth", p.auth);
    finish(scratch, &path, q, signing)
}

pub enum MessageCountsTimetoken<'a> {
    Single(&'a str),
    PerChannel(&'a [(&'a str, &'a str)]),
}

/// `/v3/history/sub-key/{sk}/message-counts/{channels}`.
pub fn build_message_counts(
    scratch: &mut Scratch<'_>,
    subscribe_key: &str,
    channels: &[&str],
    timetoken: MessageCountsTimetoken<'_>,
    auth: Option<&str>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v3/history/sub-key/");
    path.push_str(subscribe_key);
    path.push_str("/message-counts/");
    path.push_str(&join_channels(channels));

    let mut q = QueryParams::new();
    match timetoken {
        MessageCountsTimetoken::Single(tt) => {
            q.push("timetoken", tt);
        }
        MessageCountsTimetoken::PerChannel(pairs) => {
            let joined = pairs
                .iter()
                .map(|(ch, tt)| alloc::format!("{ch}-{tt}"))
                .collect::<Vec<_>>()
                .join(",");
            q.push("channelsTimetoken", joined);
        }
    }
    q.push_opt("auth", auth);
    finish(scratch, &path, q, signing)
}

/// `DELETE /v3/history/sub-key/{sk}/channel/{channel}`.
pub fn build_delete_messages(
    scratch: &mut Scratch<'_>,
    subscribe_key: &str,
    channel: &str,
    start: Option<&str>,
    end: Option<&str>,
    auth: Option<&str>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v3/history/sub-key/");
    path.push_str(subscribe_key);
    path.push_str("/channel/");
    path.push_str(channel);

    let mut q = QueryParams::new();
    q.push_opt("start", start);
    q.push_opt("end", end);
    q.push_opt("auth", auth);
    finish(scratch, &path, q, signing)
}

fn join_channels(channels: &[&str]) -> String {
    channels.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_is_25_when_actions_requested() {
        assert_eq!(default_max_per_channel(1, true), 25);
    }

    #[test]
    fn default_max_is_25_for_multi_channel() {
        assert_eq!(default_max_per_channel(2, false), 25);
    }

    #[test]
    fn default_max_is_100_for_single_channel_no_actions() {
        assert_eq!(default_max_per_channel(1, false), 100);
    }
}
