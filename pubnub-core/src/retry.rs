//! Retry policy — C7.
//!
//! Computes the delay before retrying a failed transaction, and whether a
//! given outcome is retryable at all. Grounded on `pubnub_retry_configuration.c`
//! from the original C SDK (constants reproduced from notes taken before the
//! retrieval pack was lost — see DESIGN.md): linear default 2s/10 attempts,
//! exponential default base 2s/cap 150s/6 attempts.
use crate::error::ResultCode;

/// One bit per endpoint family a caller can exclude from retry (spec.md
/// §4.C7). Bitmap rather than a `Vec<EndpointGroup>` because it's copied by
/// value into every transaction's retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExcludedGroups(u8);

impl ExcludedGroups {
    pub const SUBSCRIBE: Self = Self(1 << 0);
    pub const PUBLISH: Self = Self(1 << 1);
    pub const PRESENCE: Self = Self(1 << 2);
    pub const STORAGE: Self = Self(1 << 3);
    pub const GROUPS: Self = Self(1 << 4);
    pub const APP_CONTEXT: Self = Self(1 << 5);
    pub const REACTIONS: Self = Self(1 << 6);
    pub const PAM: Self = Self(1 << 7);

    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, group: Self) -> bool {
        self.0 & group.0 != 0
    }
}

/// Which endpoint group a transaction belongs to, for checking against
/// [`ExcludedGroups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointGroup {
    Subscribe,
    Publish,
    Presence,
    Storage,
    Groups,
    AppContext,
    Reactions,
    Pam,
}

impl EndpointGroup {
    fn bit(self) -> ExcludedGroups {
        match self {
            EndpointGroup::Subscribe => ExcludedGroups::SUBSCRIBE,
            EndpointGroup::Publish => ExcludedGroups::PUBLISH,
            EndpointGroup::Presence => ExcludedGroups::PRESENCE,
            EndpointGroup::Storage => ExcludedGroups::STORAGE,
            EndpointGroup::Groups => ExcludedGroups::GROUPS,
            EndpointGroup::AppContext => ExcludedGroups::APP_CONTEXT,
            EndpointGroup::Reactions => ExcludedGroups::REACTIONS,
            EndpointGroup::Pam => ExcludedGroups::PAM,
        }
    }
}

/// Linear or exponential backoff, with the original C SDK's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Linear {
        delay_ms: u32,
        max_attempts: u32,
    },
    Exponential {
        base_ms: u32,
        cap_ms: u32,
        max_attempts: u32,
    },
    None,
}

impl RetryPolicy {
    pub const fn linear_default() -> Self {
        RetryPolicy::Linear {
            delay_ms: 2_000,
            max_attempts: 10,
        }
    }

    pub const fn exponential_default() -> Self {
        RetryPolicy::Exponential {
            base_ms: 2_000,
            cap_ms: 150_000,
            max_attempts: 6,
        }
    }

    pub fn max_attempts(self) -> u32 {
        match self {
            RetryPolicy::Linear { max_attempts, .. } => max_attempts,
            RetryPolicy::Exponential { max_attempts, .. } => max_attempts,
            RetryPolicy::None => 0,
        }
    }

    /// Delay before attempt `attempt` (1-based), before jitter and before
    /// any `Retry-After` override.
    fn base_delay_ms(self, attempt: u32) -> u32 {
        match self {
            RetryPolicy::Linear { delay_ms, .. } => delay_ms,
            RetryPolicy::Exponential { base_ms, cap_ms, .. } => {
                let shift = attempt.saturating_sub(1).min(31);
                let scaled = base_ms.saturating_mul(1u32 << shift);
                scaled.min(cap_ms)
            }
            RetryPolicy::None => 0,
        }
    }
}

/// Whether `code`/`http_status` together describe a retryable outcome
/// (spec.md §4.C7): the result kind must be in the retryable set *and* the
/// HTTP status, when present, must be 429, >=500, or 0 (no response).
pub fn is_retryable(code: ResultCode, http_status: u16) -> bool {
    code.is_retryable_kind() && (http_status == 429 || http_status >= 500 || http_status == 0)
}

/// Decides whether to arm a retry timer for `attempt` (the attempt number
/// that just failed, 1-based), and for how long. `retry_after_secs` is the
/// server's `Retry-After` header on a 429, which supersedes the computed
/// delay. `seed` drives the jitter and should vary per call (e.g. a
/// monotonic counter or the low bits of a clock reading) — this crate never
/// reaches for an RNG crate for something this local.
pub fn next_delay_ms(
    policy: RetryPolicy,
    group: EndpointGroup,
    excluded: ExcludedGroups,
    attempt: u32,
    retry_after_secs: Option<u32>,
    seed: u32,
) -> Option<u32> {
    if matches!(policy, RetryPolicy::None) || excluded.contains(group.bit()) {
        return None;
    }
    if attempt > policy.max_attempts() {
        return None;
    }
    if let Some(secs) = retry_after_secs {
        return Some(secs.saturating_mul(1000));
    }
    let base = policy.base_delay_ms(attempt);
    Some(base + jitter_ms(seed))
}

const MAX_JITTER_MS: u32 = 1_000;

/// A small deterministic mixing function (splitmix-style) used only to
/// spread retries across [0, 1000) ms; not a cryptographic or
/// statistically-rigorous PRNG, matching the original's use of a cheap
/// local jitter source rather than a general RNG.
fn jitter_ms(seed: u32) -> u32 {
    let mut x = seed.wrapping_add(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x % MAX_JITTER_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_delay_is_constant_across_attempts() {
        let p = RetryPolicy::linear_default();
        assert_eq!(p.base_delay_ms(1), 2_000);
        assert_eq!(p.base_delay_ms(9), 2_000);
    }

    #[test]
    fn exponential_delay_doubles_then_caps() {
        let p = RetryPolicy::exponential_default();
        assert_eq!(p.base_delay_ms(1), 2_000);
        assert_eq!(p.base_delay_ms(2), 4_000);
        assert_eq!(p.base_delay_ms(3), 8_000);
        assert_eq!(p.base_delay_ms(7), 128_000);
        assert_eq!(p.base_delay_ms(8), 150_000);
    }

    #[test]
    fn http_status_gates_retryability() {
        assert!(is_retryable(ResultCode::Timeout, 0));
        assert!(is_retryable(ResultCode::HttpError, 429));
        assert!(is_retryable(ResultCode::HttpError, 500));
        assert!(!is_retryable(ResultCode::HttpError, 404));
        assert!(!is_retryable(ResultCode::FormatError, 500));
    }

    #[test]
    fn excluded_group_disables_retry() {
        let excluded = ExcludedGroups::SUBSCRIBE;
        let delay = next_delay_ms(
            RetryPolicy::linear_default(),
            EndpointGroup::Subscribe,
            excluded,
            1,
            None,
            42,
        );
        assert!(delay.is_none());
    }

    #[test]
    fn attempt_cap_stops_retry() {
        let delay = next_delay_ms(
            RetryPolicy::linear_default(),
            EndpointGroup::Publish,
            ExcludedGroups::none(),
            11,
            None,
            42,
        );
        assert!(delay.is_none());
    }

    #[test]
    fn retry_after_supersedes_computed_delay() {
        let delay = next_delay_ms(
            RetryPolicy::linear_default(),
            EndpointGroup::Publish,
            ExcludedGroups::none(),
            1,
            Some(5),
            42,
        );
        assert_eq!(delay, Some(5_000));
    }

    #[test]
    fn jitter_stays_under_one_second() {
        for seed in 0..100u32 {
            assert!(jitter_ms(seed) < MAX_JITTER_MS);
        }
    }

    proptest::proptest! {
        #[test]
        fn exponential_delay_never_exceeds_its_cap(attempt in 1u32..10_000) {
            let p = RetryPolicy::exponential_default();
            let RetryPolicy::Exponential { cap_ms, .. } = p else { unreachable!() };
            proptest::prop_assert!(p.base_delay_ms(attempt) <= cap_ms);
        }

        #[test]
        fn linear_delay_never_exceeds_its_fixed_value(attempt in 1u32..10_000) {
            let p = RetryPolicy::linear_default();
            let RetryPolicy::Linear { delay_ms, .. } = p else { unreachable!() };
            proptest::prop_assert_eq!(p.base_delay_ms(attempt), delay_ms);
        }

        #[test]
        fn jitter_is_always_bounded(seed in proptest::prelude::any::<u32>()) {
            proptest::prop_assert!(jitter_ms(seed) < MAX_JITTER_MS);
        }

        #[test]
        fn attempt_past_max_never_yields_a_delay(attempt in 11u32..10_000, seed in proptest::prelude::any::<u32>()) {
            let delay = next_delay_ms(
                RetryPolicy::linear_default(),
                EndpointGroup::Publish,
                ExcludedGroups::none(),
                attempt,
                None,
                seed,
            );
            proptest::prop_assert!(delay.is_none());
        }
    }
}
