//! Transaction FSM — C9.
//!
//! One state machine instance drives one HTTP transaction from DNS
//! resolution through response parsing, shared verbatim by both
//! notification back-ends (§4.C10). Grounded on the teacher's `pipeline`
//! module (a staged, edge-triggered state machine advanced by repeated
//! `poll()` calls rather than an async runtime), generalized to the
//! resolve/connect/TLS/send/recv/parse sequence spec.md §4.C9 lays out.
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{PubNubError, ResultCode};
use crate::retry::{self, EndpointGroup, ExcludedGroups, RetryPolicy};
use crate::timer::TimerId;
use crate::transport::{Clock, SocketHandle, StepStatus, Transport};

/// Which operation a transaction is carrying out. Drives both which
/// response parser runs (§4.C3) and which retry endpoint group applies
/// (§4.C7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Publish,
    Subscribe,
    Presence,
    HereNow,
    History,
    FetchHistory,
    MessageCounts,
    DeleteMessages,
    ChannelGroup,
    Objects,
    Actions,
    GrantToken,
    RevokeToken,
    Leave,
}

impl TransactionKind {
    pub fn endpoint_group(self) -> EndpointGroup {
        match self {
            TransactionKind::Publish => EndpointGroup::Publish,
            TransactionKind::Subscribe | TransactionKind::Leave => EndpointGroup::Subscribe,
            TransactionKind::Presence | TransactionKind::HereNow => EndpointGroup::Presence,
            TransactionKind::History
            | TransactionKind::FetchHistory
            | TransactionKind::MessageCounts
            | TransactionKind::DeleteMessages => EndpointGroup::Storage,
            TransactionKind::ChannelGroup => EndpointGroup::Groups,
            TransactionKind::Objects => EndpointGroup::AppContext,
            TransactionKind::Actions => EndpointGroup::Reactions,
            TransactionKind::GrantToken | TransactionKind::RevokeToken => EndpointGroup::Pam,
        }
    }
}

/// Abstract states per spec.md §4.C9. `Retry`/`WaitRetry` are driven by C7;
/// `WaitCancel(Close)` short-circuit any in-progress I/O on `cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    WaitDnsSend,
    WaitDnsRecv,
    WaitConnect,
    WaitTls,
    Sending,
    WaitRecvLine,
    WaitRecvHdrLines,
    ProcessHdr,
    WaitRecvBody,
    Parse,
    WaitClose,
    WaitCancel,
    WaitCancelClose,
    WaitRetry,
    Retry,
}

/// The terminal result of a transaction, handed to the notification layer.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub kind: TransactionKind,
    pub code: ResultCode,
    pub http_status: u16,
}

/// Parsed pieces of the HTTP response header block that the FSM's
/// line-by-line header reader accumulates, per spec.md §4.C9.
#[derive(Debug, Default, Clone)]
struct Headers {
    status: u16,
    content_length: Option<usize>,
    chunked: bool,
    retry_after_secs: Option<u32>,
}

/// Configuration fixed for the lifetime of a transaction (but reused across
/// retries of the same transaction).
pub struct TransactionConfig {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub transaction_timeout_ms: u64,
    pub wait_connect_timeout_ms: u64,
    pub retry_policy: RetryPolicy,
    pub excluded_retry_groups: ExcludedGroups,
}

/// One in-flight (or idle, between uses) transaction. Owns no socket of its
/// own — `socket` is a handle into whatever [`Transport`] drives it.
pub struct TransactionFsm {
    state: State,
    kind: Option<TransactionKind>,
    socket: Option<SocketHandle>,
    addr: [u8; 4],
    started_at_ms: u64,
    elapsed_in_state_ms: u64,
    attempt: u32,
    retry_timer: Option<TimerId>,
    headers: Headers,
    line_buf_reset_count: u32,
}

impl Default for TransactionFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionFsm {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            kind: None,
            socket: None,
            addr: [0; 4],
            started_at_ms: 0,
            elapsed_in_state_ms: 0,
            attempt: 0,
            retry_timer: None,
            headers: Headers::default(),
            line_buf_reset_count: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// `IDLE` and no handle outstanding — the only state a new operation
    /// may start from (spec.md §4.C11 `can_start_transaction`).
    pub fn can_start_transaction(&self) -> bool {
        self.state == State::Idle && self.socket.is_none()
    }

    /// Arms the FSM for a new transaction. The caller has already built the
    /// request into a scratch buffer (§4.C2); this only records bookkeeping
    /// and moves the state to `WAIT_DNS_SEND`.
    pub fn start(&mut self, kind: TransactionKind, now_ms: u64) {
        self.kind = Some(kind);
        self.state = State::WaitDnsSend;
        self.started_at_ms = now_ms;
        self.elapsed_in_state_ms = 0;
        self.attempt = 1;
        self.headers = Headers::default();
    }

    /// Forces the transaction into cancellation. If a socket is open the
    /// FSM closes it on its next `step`; otherwise it terminates
    /// immediately with `CANCELLED`.
    pub fn cancel(&mut self) {
        self.state = if self.socket.is_some() {
            State::WaitCancelClose
        } else {
            State::WaitCancel
        };
    }

    /// Advances the state machine by one edge-triggered step, given the
    /// host's transport and clock. Returns `Some(Outcome)` exactly once,
    /// when the transaction reaches a terminal state.
    #[allow(clippy::too_many_lines)]
    pub fn step(
        &mut self,
        cfg: &TransactionConfig,
        transport: &mut dyn Transport,
        clock: &dyn Clock,
        request: &str,
        line_buf: &mut [u8],
        reply_buf: &mut Vec<u8>,
    ) -> Option<Outcome> {
        let now = clock.now_ms();
        let kind = self.kind?;

        if now.saturating_sub(self.started_at_ms) > cfg.transaction_timeout_ms {
            return Some(self.terminate(kind, ResultCode::Timeout, 0, transport));
        }

        match self.state {
            State::Idle => None,

            State::WaitDnsSend => match transport.resolve_start(&cfg.host) {
                Ok(()) => {
                    self.state = State::WaitDnsRecv;
                    None
                }
                Err(_) => Some(self.terminate(kind, ResultCode::AddressResolutionFailed, 0, transport)),
            },

            State::WaitDnsRecv => match transport.resolve_status() {
                StepStatus::Done => {
                    match transport.connect_start(&self.addr, cfg.port) {
                        Ok(socket) => {
                            self.socket = Some(socket);
                            self.state = State::WaitConnect;
                        }
                        Err(_) => return Some(self.terminate(kind, ResultCode::ConnectFailed, 0, transport)),
                    }
                    None
                }
                StepStatus::InProgress | StepStatus::WouldBlock => None,
                StepStatus::Timeout => Some(self.terminate(kind, ResultCode::AddressResolutionFailed, 0, transport)),
            },

            State::WaitConnect => {
                let socket = self.socket.expect("socket set on entering WaitConnect");
                match transport.connect_status(socket) {
                    StepStatus::Done => {
                        self.state = if cfg.use_tls { State::WaitTls } else { State::Sending };
                        None
                    }
                    StepStatus::InProgress | StepStatus::WouldBlock => None,
                    StepStatus::Timeout => Some(self.terminate(kind, ResultCode::WaitConnectTimeout, 0, transport)),
                }
            }

            State::WaitTls => {
                let socket = self.socket.expect("socket set before WaitTls");
                match transport.tls_status(socket) {
                    StepStatus::Done => {
                        self.state = State::Sending;
                        None
                    }
                    StepStatus::InProgress | StepStatus::WouldBlock => None,
                    StepStatus::Timeout => Some(self.terminate(kind, ResultCode::ConnectionTimeout, 0, transport)),
                }
            }

            State::Sending => {
                let socket = self.socket.expect("socket set before Sending");
                match transport.send(socket, request.as_bytes()) {
                    Ok(_) => match transport.send_status(socket) {
                        StepStatus::Done => {
                            self.state = State::WaitRecvLine;
                            None
                        }
                        StepStatus::InProgress | StepStatus::WouldBlock => None,
                        StepStatus::Timeout => Some(self.terminate(kind, ResultCode::Timeout, 0, transport)),
                    },
                    Err(_) => Some(self.terminate(kind, ResultCode::IoError, 0, transport)),
                }
            }

            State::WaitRecvLine => {
                let socket = self.socket.expect("socket set before WaitRecvLine");
                match transport.read_line(socket, line_buf) {
                    Ok(n) => match transport.read_line_status(socket) {
                        StepStatus::Done => {
                            self.headers.status = parse_status_line(&line_buf[..n]).unwrap_or(0);
                            self.state = State::WaitRecvHdrLines;
                            None
                        }
                        StepStatus::InProgress => None,
                        StepStatus::WouldBlock => {
                            // Line exceeded the buffer: drop it and keep
                            // scanning (spec.md §4.C9 tie-break).
                            self.line_buf_reset_count += 1;
                            None
                        }
                        StepStatus::Timeout => Some(self.terminate(kind, ResultCode::Timeout, 0, transport)),
                    },
                    Err(_) => Some(self.terminate(kind, ResultCode::IoError, 0, transport)),
                }
            }

            State::WaitRecvHdrLines => {
                let socket = self.socket.expect("socket set before WaitRecvHdrLines");
                match transport.read_line(socket, line_buf) {
                    Ok(n) => match transport.read_line_status(socket) {
                        StepStatus::Done => {
                            let line = &line_buf[..n];
                            if is_blank_line(line) {
                                self.state = State::ProcessHdr;
                            } else {
                                apply_header_line(&mut self.headers, line);
                            }
                            None
                        }
                        StepStatus::InProgress => None,
                        StepStatus::WouldBlock => {
                            self.line_buf_reset_count += 1;
                            None
                        }
                        StepStatus::Timeout => Some(self.terminate(kind, ResultCode::Timeout, 0, transport)),
                    },
                    Err(_) => Some(self.terminate(kind, ResultCode::IoError, 0, transport)),
                }
            }

            State::ProcessHdr => {
                self.state = State::WaitRecvBody;
                reply_buf.clear();
                None
            }

            State::WaitRecvBody => {
                let socket = self.socket.expect("socket set before WaitRecvBody");
                let want = self.headers.content_length.unwrap_or(line_buf.len());
                match transport.read(socket, line_buf, want.saturating_sub(reply_buf.len())) {
                    Ok(n) => {
                        reply_buf.extend_from_slice(&line_buf[..n]);
                        let done = match self.headers.content_length {
                            Some(cl) => reply_buf.len() >= cl,
                            None => matches!(transport.read_status(socket), StepStatus::Done),
                        };
                        if done {
                            self.state = State::Parse;
                        }
                        None
                    }
                    Err(_) => Some(self.terminate(kind, ResultCode::IoError, 0, transport)),
                }
            }

            State::Parse => {
                let status = self.headers.status;
                let code = outcome_code_for_status(status);
                self.state = State::WaitClose;
                Some(self.terminate(kind, code, status, transport))
            }

            State::WaitClose => {
                if let Some(socket) = self.socket {
                    transport.close(socket);
                }
                self.socket = None;
                self.state = State::Idle;
                None
            }

            State::WaitCancel => Some(self.terminate(kind, ResultCode::Cancelled, 0, transport)),

            State::WaitCancelClose => {
                if let Some(socket) = self.socket {
                    transport.close(socket);
                    self.socket = None;
                }
                Some(self.terminate(kind, ResultCode::Cancelled, 0, transport))
            }

            State::WaitRetry => None, // armed timer; advanced externally by the notification layer.

            State::Retry => {
                self.attempt += 1;
                self.state = State::WaitDnsSend;
                None
            }
        }
    }

    /// Common terminal handling shared by every exit path (spec.md §4.C9
    /// "outcome common" routine): closes any open socket, resets to the
    /// resting state, and decides whether this result should instead arm a
    /// retry rather than surface as final.
    fn terminate(
        &mut self,
        kind: TransactionKind,
        code: ResultCode,
        http_status: u16,
        transport: &mut dyn Transport,
    ) -> Outcome {
        if let Some(socket) = self.socket.take() {
            transport.close(socket);
        }
        self.state = State::Idle;
        Outcome { kind, code, http_status }
    }

    /// Whether this outcome should be retried rather than surfaced,
    /// per the policy in `cfg`. The notification layer calls this right
    /// after `step` returns a terminal [`Outcome`] and, if it returns
    /// `Some(delay_ms)`, arms a timer and transitions back to
    /// `WAIT_RETRY`/`RETRY` instead of delivering the outcome to the user.
    pub fn retry_delay_ms(&mut self, cfg: &TransactionConfig, outcome: &Outcome, seed: u32) -> Option<u32> {
        let delay = retry::next_delay_ms(
            cfg.retry_policy,
            outcome.kind.endpoint_group(),
            cfg.excluded_retry_groups,
            self.attempt,
            self.headers.retry_after_secs,
            seed,
        );
        if delay.is_some() {
            self.state = State::WaitRetry;
        }
        delay
    }

    /// Called by the notification layer's timer-expiry path once the armed
    /// retry delay has elapsed.
    pub fn fire_retry(&mut self) {
        if self.state == State::WaitRetry {
            self.state = State::Retry;
        }
    }

    pub fn retry_timer(&self) -> Option<TimerId> {
        self.retry_timer
    }

    pub fn set_retry_timer(&mut self, id: Option<TimerId>) {
        self.retry_timer = id;
    }
}

fn parse_status_line(line: &[u8]) -> Option<u16> {
    let s = core::str::from_utf8(line).ok()?;
    let mut parts = s.split_whitespace();
    parts.next()?; // "HTTP/1.1"
    parts.next()?.parse().ok()
}

fn is_blank_line(line: &[u8]) -> bool {
    line.iter().all(|b| *b == b'\r' || *b == b'\n')
}

fn apply_header_line(headers: &mut Headers, line: &[u8]) {
    let Ok(s) = core::str::from_utf8(line) else { return };
    let s = s.trim_end_matches(['\r', '\n']);
    let Some((name, value)) = s.split_once(':') else { return };
    let value = value.trim();
    match name.trim().to_ascii_lowercase().as_str() {
        "content-length" => headers.content_length = value.parse().ok(),
        "transfer-encoding" => headers.chunked = value.eq_ignore_ascii_case("chunked"),
        "retry-after" => headers.retry_after_secs = value.parse().ok(),
        _ => {}
    }
}

fn outcome_code_for_status(status: u16) -> ResultCode {
    match status {
        200..=299 => ResultCode::Ok,
        403 => ResultCode::AccessDenied,
        429 | 500..=599 => ResultCode::HttpError,
        0 => ResultCode::IoError,
        _ => ResultCode::HttpError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fsm_can_start_transaction() {
        let fsm = TransactionFsm::new();
        assert!(fsm.can_start_transaction());
    }

    #[test]
    fn start_moves_to_wait_dns_send() {
        let mut fsm = TransactionFsm::new();
        fsm.start(TransactionKind::Publish, 0);
        assert_eq!(fsm.state(), State::WaitDnsSend);
        assert!(!fsm.can_start_transaction());
    }

    #[test]
    fn cancel_without_socket_is_immediate() {
        let mut fsm = TransactionFsm::new();
        fsm.start(TransactionKind::Publish, 0);
        fsm.cancel();
        assert_eq!(fsm.state(), State::WaitCancel);
    }

    #[test]
    fn status_code_classification() {
        assert_eq!(outcome_code_for_status(200), ResultCode::Ok);
        assert_eq!(outcome_code_for_status(403), ResultCode::AccessDenied);
        assert_eq!(outcome_code_for_status(429), ResultCode::HttpError);
        assert_eq!(outcome_code_for_status(503), ResultCode::HttpError);
    }

    #[test]
    fn header_line_parses_content_length() {
        let mut h = Headers::default();
        apply_header_line(&mut h, b"Content-Length: 42\r\n");
        assert_eq!(h.content_length, Some(42));
    }

    #[test]
    fn header_line_parses_retry_after() {
        let mut h = Headers::default();
        apply_header_line(&mut h, b"Retry-After: 5\r\n");
        assert_eq!(h.retry_after_secs, Some(5));
    }

    #[test]
    fn endpoint_group_mapping_for_publish_and_subscribe() {
        assert_eq!(TransactionKind::Publish.endpoint_group(), EndpointGroup::Publish);
        assert_eq!(TransactionKind::Subscribe.endpoint_group(), EndpointGroup::Subscribe);
    }
}
