//! `pubnub-core`: the transaction engine behind a portable pub/sub client.
//!
//! This is the only crate in the workspace with no transport implementation
//! of its own. It knows how to build an outbound request, parse the response
//! that comes back, and drive the two through a state machine a caller can
//! either block on or poll from a callback loop (see `fsm`). URL building,
//! JSON scanning, and retry backoff all live here because none of it depends
//! on how bytes actually move -- each host platform only has to implement
//! `transport::Transport` and `transport::Clock` to get the rest for free.
//!
//! This crate is `no_std` + `alloc`: it has to run on everything from a
//! POSIX box to a microcontroller networking stack, so it never assumes a
//! thread, a clock, or a socket exists — those are supplied by a host crate
//! (e.g. `pubnub-transport-std`) through the traits in [`transport`].
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod assert;
pub mod context;
pub mod dns;
pub mod error;
pub mod fsm;
pub mod gzip;
pub mod json;
pub mod notify;
pub mod percent;
pub mod request;
pub mod response;
pub mod retry;
pub mod subscribe_v2;
pub mod timer;
pub mod transport;

pub use context::{Context, ContextHandle, ContextRegistry};
pub use error::{PubNubError, ResultCode};
pub use fsm::{Outcome, TransactionFsm, TransactionKind};
