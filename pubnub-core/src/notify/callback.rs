//! Callback back-end: a single watcher owns a set of in-flight contexts, a
//! timer list (§4.C6) ordered by remaining transaction timeout, and is
//! driven by a host worker loop that polls I/O readiness at a short tick
//! (spec.md §4.C10 default ≈200ms), advances the timer list by elapsed wall
//! time, and forces any now-expired context through `stop(TIMEOUT)`.
//!
//! The watcher never calls the user's callback while holding a context's
//! slot locked — it records the outcome, then the host's dispatch loop
//! invokes the callback after the bookkeeping below returns, matching
//! spec.md §4.C10's "outside the context mutex, after state is consistent."
use alloc::vec::Vec;

use crate::fsm::Outcome;
use crate::timer::{TimerId, TimerList};

/// The user-registered completion hook: `(transaction kind, result, user
/// data)` per spec.md §6's abstract callback signature. `UserData` is
/// whatever opaque pointer-sized token the host wants threaded back.
pub trait Callback<UserData> {
    fn on_outcome(&mut self, outcome: &Outcome, user_data: &UserData);
}

struct Registered<UserData> {
    id: TimerId,
    user_data: UserData,
}

/// Tracks every context currently registered for I/O readiness, alongside
/// a shared timer list. Does not itself own sockets or threads — the host
/// crate supplies the select/poll/`FD_SET` equivalent and calls
/// [`Watcher::tick`] once per wake-up.
pub struct Watcher<UserData> {
    timers: TimerList,
    registered: Vec<Registered<UserData>>,
    next_id: TimerId,
}

impl<UserData> Default for Watcher<UserData> {
    fn default() -> Self {
        Self::new()
    }
}

impl<UserData> Watcher<UserData> {
    pub fn new() -> Self {
        Self {
            timers: TimerList::new(),
            registered: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a context with `transaction_timeout_ms` remaining,
    /// returning the [`TimerId`] the caller should associate with it.
    pub fn register(&mut self, transaction_timeout_ms: i64, user_data: UserData) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.add(id, transaction_timeout_ms);
        self.registered.push(Registered { id, user_data });
        id
    }

    pub fn unregister(&mut self, id: TimerId) {
        self.timers.remove(id);
        self.registered.retain(|r| r.id != id);
    }

    pub fn pending_count(&self) -> usize {
        self.registered.len()
    }

    /// The next tick the watcher should sleep for before the soonest
    /// context's timeout expires (the host still polls more often if any
    /// socket becomes ready sooner).
    pub fn next_tick_ms(&self) -> Option<i64> {
        self.timers.next_deadline_ms()
    }

    /// Advances the timer list by `elapsed_ms` and returns the user data
    /// for every context whose transaction timeout just expired, removing
    /// them from bookkeeping. The host forces each through `fsm.cancel()`
    /// (or a direct `TIMEOUT` outcome) and then dispatches its callback.
    pub fn expire(&mut self, elapsed_ms: i64) -> Vec<UserData> {
        let expired_ids = self.timers.advance(elapsed_ms);
        let mut out = Vec::with_capacity(expired_ids.len());
        for id in expired_ids {
            if let Some(pos) = self.registered.iter().position(|r| r.id == id) {
                out.push(self.registered.remove(pos).user_data);
            }
        }
        out
    }

    /// Delivers a terminal outcome to `cb`, then drops the context's
    /// registration. Called by the host once a ready context's
    /// `fsm.step()` produces `Some(outcome)`.
    pub fn dispatch(&mut self, id: TimerId, outcome: Outcome, cb: &mut dyn Callback<UserData>)
    where
        UserData: Clone,
    {
        if let Some(pos) = self.registered.iter().position(|r| r.id == id) {
            let user_data = self.registered[pos].user_data.clone();
            self.timers.remove(id);
            self.registered.remove(pos);
            cb.on_outcome(&outcome, &user_data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_expire_round_trip() {
        let mut w: Watcher<u32> = Watcher::new();
        let id = w.register(1000, 42);
        assert_eq!(w.pending_count(), 1);
        let none_yet = w.expire(500);
        assert!(none_yet.is_empty());
        let expired = w.expire(600);
        assert_eq!(expired, alloc::vec![42]);
        assert_eq!(w.pending_count(), 0);
        let _ = id;
    }

    #[test]
    fn unregister_drops_pending_context() {
        let mut w: Watcher<u32> = Watcher::new();
        let id = w.register(1000, 1);
        w.unregister(id);
        assert_eq!(w.pending_count(), 0);
    }
}
