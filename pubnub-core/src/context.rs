//! Context lifecycle & API surface — C11.
//!
//! A `Context` bundles the credentials, FSM, retry/heartbeat configuration
//! and iterator state for one logical pub/sub client (spec.md §3 data
//! model). `ContextRegistry` owns a pool of them, either a fixed-capacity
//! static pool or a growable dynamic one, mirroring the original C SDK's
//! `pubnub_alloc_std.c` (malloc-backed) vs. `pubnub_alloc_static.c`
//! (fixed-array) allocators — notes on both taken before the retrieval pack
//! was lost (see DESIGN.md).
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{PubNubError, ResultCode};
use crate::fsm::TransactionFsm;

/// Minimum auto-heartbeat period the context clamps down to, per spec.md
/// §4.C11.
pub const MIN_HEARTBEAT_PERIOD_SECS: u32 = 20;
/// The default period used when auto-heartbeat is enabled without an
/// explicit override.
pub const DEFAULT_HEARTBEAT_PERIOD_SECS: u32 = 300;

/// Credentials and per-context configuration set at `init` and mutable
/// thereafter through dedicated setters (spec.md §3).
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    pub publish_key: String,
    pub subscribe_key: String,
    pub secret_key: Option<String>,
    pub auth_token: Option<String>,
    pub user_id: String,
    pub origin: String,
}

/// Auto-heartbeat scheduling state, preserved across re-subscribes (spec.md
/// §4.C11).
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatState {
    pub enabled: bool,
    pub period_secs: u32,
    pub elapsed_secs: u32,
}

impl Default for HeartbeatState {
    fn default() -> Self {
        Self {
            enabled: false,
            period_secs: DEFAULT_HEARTBEAT_PERIOD_SECS,
            elapsed_secs: 0,
        }
    }
}

impl HeartbeatState {
    /// Sets the period, clamped to the floor spec.md §4.C11 mandates.
    pub fn set_period_secs(&mut self, requested: u32) {
        self.period_secs = requested.max(MIN_HEARTBEAT_PERIOD_SECS);
    }

    /// Advances the elapsed counter and reports whether a heartbeat is due.
    /// The caller is responsible for deferring if a main subscribe is
    /// in-flight (spec.md §4.C11: "if a main subscribe is in progress it
    /// defers until completion").
    pub fn tick(&mut self, elapsed_secs: u32) -> bool {
        if !self.enabled {
            return false;
        }
        self.elapsed_secs += elapsed_secs;
        if self.elapsed_secs >= self.period_secs {
            self.elapsed_secs = 0;
            true
        } else {
            false
        }
    }
}

/// Last-result bookkeeping exposed to callers between operations (spec.md
/// §3: "last-result code, last-transaction-kind, HTTP status code").
#[derive(Debug, Clone, Default)]
pub struct LastResult {
    pub code: Option<ResultCode>,
    pub http_status: u16,
}

/// One logical pub/sub client instance.
pub struct Context {
    pub config: ContextConfig,
    pub fsm: TransactionFsm,
    pub heartbeat: HeartbeatState,
    pub last_result: LastResult,
    /// Reset to `"0"` on init and whenever a subscribe-format error forces
    /// a re-join (spec.md §3 invariant 4, §7).
    pub timetoken: String,
    pub subscribed_channels: Vec<String>,
    pub subscribed_groups: Vec<String>,
}

impl Context {
    fn new(publish_key: impl Into<String>, subscribe_key: impl Into<String>) -> Self {
        Self {
            config: ContextConfig {
                publish_key: publish_key.into(),
                subscribe_key: subscribe_key.into(),
                secret_key: None,
                auth_token: None,
                user_id: String::new(),
                origin: String::new(),
            },
            fsm: TransactionFsm::new(),
            heartbeat: HeartbeatState::default(),
            last_result: LastResult::default(),
            timetoken: String::from(crate::response::RESET_TIMETOKEN),
            subscribed_channels: Vec::new(),
            subscribed_groups: Vec::new(),
        }
    }

    /// Whether `free` (via [`ContextRegistry::free`]) may reclaim this slot
    /// right now: only `IDLE` with no outstanding transaction (spec.md
    /// §4.C11).
    pub fn can_free(&self) -> bool {
        self.fsm.can_start_transaction()
    }

    /// Re-homes credentials on an already-allocated context, zeroing
    /// iterator/timetoken state — the effect of `init` in the original C
    /// SDK when called on a context that outlives the call (spec.md
    /// §4.C11).
    pub fn reinit(&mut self, publish_key: impl Into<String>, subscribe_key: impl Into<String>) {
        self.config.publish_key = publish_key.into();
        self.config.subscribe_key = subscribe_key.into();
        self.config.secret_key = None;
        self.config.auth_token = None;
        self.timetoken = String::from(crate::response::RESET_TIMETOKEN);
        self.subscribed_channels.clear();
        self.subscribed_groups.clear();
        self.heartbeat = HeartbeatState::default();
    }

    /// Resets the subscribe timetoken to force a re-join on the next
    /// subscribe, per the format-error policy in spec.md §7.
    pub fn reset_timetoken(&mut self) {
        self.timetoken = String::from(crate::response::RESET_TIMETOKEN);
    }
}

/// A handle into a [`ContextRegistry`], opaque to callers beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHandle(usize);

enum Slot {
    Empty,
    Occupied(Context),
}

/// Owns a pool of contexts. `Static` enforces a fixed `capacity` (spec.md
/// §4.C11 "static-pool (fixed MAX contexts)"); `Dynamic` grows the backing
/// `Vec` freely, trading the fixed bound for heap use — the dynamic
/// allocator's mirror in the original C SDK.
pub struct ContextRegistry {
    slots: Vec<Slot>,
    capacity: Option<usize>,
}

impl ContextRegistry {
    pub fn new_dynamic() -> Self {
        Self {
            slots: Vec::new(),
            capacity: None,
        }
    }

    pub fn new_static(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(Slot::Empty);
        }
        Self {
            slots,
            capacity: Some(capacity),
        }
    }

    /// Allocates and `init`s a new context, returning its handle, or
    /// `OUT_OF_MEMORY` if a static pool is exhausted.
    pub fn init(
        &mut self,
        publish_key: impl Into<String>,
        subscribe_key: impl Into<String>,
    ) -> Result<ContextHandle, PubNubError> {
        let publish_key = publish_key.into();
        let subscribe_key = subscribe_key.into();

        if let Some(pos) = self.slots.iter().position(|s| matches!(s, Slot::Empty)) {
            self.slots[pos] = Slot::Occupied(Context::new(publish_key, subscribe_key));
            return Ok(ContextHandle(pos));
        }
        if self.capacity.is_some() {
            return Err(PubNubError::new(ResultCode::OutOfMemory, "static context pool exhausted"));
        }
        self.slots.push(Slot::Occupied(Context::new(publish_key, subscribe_key)));
        Ok(ContextHandle(self.slots.len() - 1))
    }

    pub fn get(&self, handle: ContextHandle) -> Option<&Context> {
        match self.slots.get(handle.0) {
            Some(Slot::Occupied(ctx)) => Some(ctx),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: ContextHandle) -> Option<&mut Context> {
        match self.slots.get_mut(handle.0) {
            Some(Slot::Occupied(ctx)) => Some(ctx),
            _ => None,
        }
    }

    /// Reclaims `handle`'s slot if its context is `IDLE`; refused otherwise
    /// (spec.md §4.C11: "`free(ctx)` is refused if not `IDLE`").
    pub fn free(&mut self, handle: ContextHandle) -> Result<(), PubNubError> {
        match self.slots.get(handle.0) {
            Some(Slot::Occupied(ctx)) if ctx.can_free() => {
                self.slots[handle.0] = Slot::Empty;
                Ok(())
            }
            Some(Slot::Occupied(_)) => Err(PubNubError::new(
                ResultCode::InvalidParameters,
                "context has a transaction in flight",
            )),
            _ => Err(PubNubError::new(ResultCode::InvalidParameters, "no such context")),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Occupied(_))).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_pool_reports_out_of_memory_when_full() {
        let mut reg = ContextRegistry::new_static(1);
        let _h1 = reg.init("pk", "sk").unwrap();
        let err = reg.init("pk", "sk").unwrap_err();
        assert_eq!(err.code(), ResultCode::OutOfMemory);
    }

    #[test]
    fn dynamic_pool_never_runs_out() {
        let mut reg = ContextRegistry::new_dynamic();
        for _ in 0..100 {
            reg.init("pk", "sk").unwrap();
        }
        assert_eq!(reg.len(), 100);
    }

    #[test]
    fn free_refused_while_transaction_in_flight() {
        let mut reg = ContextRegistry::new_dynamic();
        let h = reg.init("pk", "sk").unwrap();
        reg.get_mut(h).unwrap().fsm.start(crate::fsm::TransactionKind::Publish, 0);
        assert!(reg.free(h).is_err());
    }

    #[test]
    fn free_reclaims_slot_for_reuse() {
        let mut reg = ContextRegistry::new_static(1);
        let h = reg.init("pk", "sk").unwrap();
        reg.free(h).unwrap();
        let h2 = reg.init("pk2", "sk2").unwrap();
        assert_eq!(h2, ContextHandle(0));
    }

    #[test]
    fn new_context_starts_with_reset_timetoken() {
        let mut reg = ContextRegistry::new_dynamic();
        let h = reg.init("pk", "sk").unwrap();
        assert_eq!(reg.get(h).unwrap().timetoken, "0");
    }

    #[test]
    fn heartbeat_period_is_clamped_to_floor() {
        let mut hb = HeartbeatState::default();
        hb.set_period_secs(5);
        assert_eq!(hb.period_secs, MIN_HEARTBEAT_PERIOD_SECS);
    }

    #[test]
    fn heartbeat_fires_once_period_elapses() {
        let mut hb = HeartbeatState { enabled: true, period_secs: 20, elapsed_secs: 0 };
        assert!(!hb.tick(10));
        assert!(hb.tick(10));
        assert_eq!(hb.elapsed_secs, 0);
    }
}
