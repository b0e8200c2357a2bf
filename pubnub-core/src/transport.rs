//! Transport platform-abstraction contract — C4.
//!
//! This module defines the contract only; every concrete implementation
//! (a blocking POSIX socket, a non-blocking one, a TLS-wrapped one) lives in
//! a host crate such as `pubnub-transport-std`. Grounded on the teacher's
//! `transport::Transport` trait (resolve/connect/send/recv split into
//! discrete, individually-pollable steps rather than one opaque blocking
//! call), generalized here to the DNS/connect/TLS/send/recv-line/recv-n
//! step sequence spec.md §4.C4 enumerates.
use crate::error::PubNubError;

/// The outcome of a single non-blocking step: either it completed, or the
/// caller must poll again later. Mirrors the original C SDK's
/// `PNPAL_STATUS` would-block/timeout/error split (spec.md §4.C4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    InProgress,
    WouldBlock,
    Timeout,
}

/// An opaque handle to a host socket/connection. The engine never inspects
/// it; it only threads it back through subsequent calls.
pub type SocketHandle = u64;

/// Everything the transaction FSM needs from a host platform, split into
/// the steps spec.md §4.C4's table enumerates: resolve, connect, TLS
/// handshake, send, read-line, read-n, close.
pub trait Transport {
    /// Begins resolving `host`; `socket` identifies which connection this
    /// resolution is for once it completes.
    fn resolve_start(&mut self, host: &str) -> Result<(), PubNubError>;
    fn resolve_status(&mut self) -> StepStatus;

    fn connect_start(&mut self, addr: &[u8], port: u16) -> Result<SocketHandle, PubNubError>;
    fn connect_status(&mut self, socket: SocketHandle) -> StepStatus;

    fn tls_start(&mut self, socket: SocketHandle, sni: &str) -> Result<(), PubNubError>;
    fn tls_status(&mut self, socket: SocketHandle) -> StepStatus;

    /// Sends as much of `data` as the socket currently accepts; returns the
    /// number of bytes consumed. A transport that can only report
    /// completion (not partial progress) may always consume all of `data`
    /// and surface backpressure via [`StepStatus::WouldBlock`] on the next
    /// call instead.
    fn send(&mut self, socket: SocketHandle, data: &[u8]) -> Result<usize, PubNubError>;
    fn send_status(&mut self, socket: SocketHandle) -> StepStatus;

    /// Reads into `buf` up to (and including) the next `\n`, returning the
    /// number of bytes written. `OK` when a full line was found,
    /// `IN_PROGRESS` otherwise; if the line would overflow `buf`, the
    /// caller resets the scanner and keeps going (spec.md §4.C9 tie-break).
    fn read_line(&mut self, socket: SocketHandle, buf: &mut [u8]) -> Result<usize, PubNubError>;
    fn read_line_status(&mut self, socket: SocketHandle) -> StepStatus;

    /// Reads up to `buf.len()` bytes, returning the number actually read.
    /// `OK` once `buf` is full or the requested count `n` is satisfied.
    fn read(&mut self, socket: SocketHandle, buf: &mut [u8], n: usize) -> Result<usize, PubNubError>;
    fn read_status(&mut self, socket: SocketHandle) -> StepStatus;

    fn is_closed(&self, socket: SocketHandle) -> bool;
    fn close(&mut self, socket: SocketHandle);
    fn set_blocking(&mut self, socket: SocketHandle, blocking: bool);
}

/// Wall-clock access, kept as a trait because `no_std` targets may not have
/// `std::time::Instant`. Implementations return milliseconds since an
/// arbitrary, implementation-chosen epoch — only deltas are meaningful.
pub trait Clock {
    fn now_ms(&self) -> u64;
}
