//! Sync back-end: the caller's own thread drives the FSM in a loop against
//! a millisecond stopwatch until a terminal outcome is produced, forcing
//! `TIMEOUT` if the context's transaction timeout elapses first (spec.md
//! §4.C10). There is no hidden concurrency here — this is the "single
//! suspension point" loop the concurrency model describes (spec.md §5).
use alloc::vec::Vec;

use crate::error::ResultCode;
use crate::fsm::{Outcome, TransactionConfig, TransactionFsm};
use crate::transport::{Clock, Transport};

/// Runs `fsm` to completion, retrying per `cfg.retry_policy` as outcomes
/// dictate, and returns the first outcome that is not retried away.
///
/// `seed_fn` supplies the jitter seed for each retry decision (e.g. a
/// monotonic counter on the caller's side) since this crate does not depend
/// on a general-purpose RNG.
pub fn await_transaction(
    fsm: &mut TransactionFsm,
    cfg: &TransactionConfig,
    transport: &mut dyn Transport,
    clock: &dyn Clock,
    request: &str,
    line_buf: &mut [u8],
    reply_buf: &mut Vec<u8>,
    mut seed_fn: impl FnMut() -> u32,
    // The ~10ms per-poll yield spec.md §5 calls for; a `no_std` engine has
    // no sleep primitive of its own, so the host supplies one here.
    mut poll_sleep: impl FnMut(),
) -> Outcome {
    loop {
        let Some(outcome) = fsm.step(cfg, transport, clock, request, line_buf, reply_buf) else {
            poll_sleep();
            continue;
        };

        if matches!(outcome.code, ResultCode::Cancelled) {
            return outcome;
        }

        match fsm.retry_delay_ms(cfg, &outcome, seed_fn()) {
            Some(_delay_ms) => {
                // A real host sleeps out the computed delay (or arms a
                // retry timer and re-enters this loop once it fires); the
                // backoff wait itself is a host concern, not this engine's.
                fsm.fire_retry();
                continue;
            }
            None => return outcome,
        }
    }
}
