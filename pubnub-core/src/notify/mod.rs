//! Notification layer — C10.
//!
//! Two interchangeable back-ends share one [`crate::fsm::TransactionFsm`]
//! and outcome routine: [`sync`] drives the FSM to completion on the
//! caller's own thread, [`callback`] dispatches it from a shared watcher on
//! I/O readiness and timer ticks. Grounded on the teacher's `runtime`
//! module's two scheduling modes (blocking drive vs. reactor-dispatched).
pub mod callback;
pub mod sync;

pub use callback::{Callback, Watcher};
pub use sync::await_transaction;
