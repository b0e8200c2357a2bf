//! The one concrete transport this workspace ships: non-blocking
//! `std::net::TcpStream` sockets, optional TLS via `rustls`, and a
//! `std::time::Instant`-backed clock — implementing the contracts
//! `pubnub-core::transport` declares so the transaction engine can run on
//! any POSIX/Windows host with a standard library.
//!
//! Grounded on the teacher's `spark-transport-tcp` crate (a channel/listener
//! split with backpressure-aware, non-blocking reads/writes), adapted here
//! from a server listener into a client `Transport` since this spec's C4
//! contract is outbound-only and driven by the engine's own state machine
//! rather than by a Tokio reactor.
mod clock;
mod socket;
mod tls;

pub use clock::StdClock;
pub use socket::{SocketError, StdTransport};
pub use tls::TlsConfig;
