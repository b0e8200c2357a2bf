use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Instant;

use rustls::{ClientConnection, ServerName};
use socket2::{Domain, Protocol, Socket, Type};

use pubnub_core::error::{PubNubError, ResultCode};
use pubnub_core::transport::{Clock, SocketHandle, StepStatus, Transport};

use crate::tls::TlsConfig;

#[derive(Debug)]
pub enum SocketError {
    Resolve(std::io::Error),
    NoAddresses,
    Connect(std::io::Error),
    Tls(String),
    Io(std::io::Error),
}

impl core::fmt::Display for SocketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SocketError::Resolve(e) => write!(f, "dns resolution failed: {e}"),
            SocketError::NoAddresses => write!(f, "host resolved to no addresses"),
            SocketError::Connect(e) => write!(f, "connect failed: {e}"),
            SocketError::Tls(e) => write!(f, "tls handshake failed: {e}"),
            SocketError::Io(e) => write!(f, "socket i/o error: {e}"),
        }
    }
}

impl core::error::Error for SocketError {}

struct Conn {
    stream: TcpStream,
    tls: Option<ClientConnection>,
    line_acc: Vec<u8>,
    connect_started_at: Instant,
    connected: bool,
    closed: bool,
}

/// The std-backed [`Transport`] implementation. Name resolution is
/// delegated to the OS resolver via [`ToSocketAddrs`] rather than
/// `pubnub-core`'s own DNS codec — that codec exists for hosts with no OS
/// resolver at all; a standard host already has one, so reusing it here
/// avoids a second resolution path plus UDP socket for the common case.
pub struct StdTransport {
    conns: HashMap<SocketHandle, Conn>,
    next_handle: u64,
    resolved: Vec<std::net::IpAddr>,
    wait_connect_timeout_ms: u64,
    tls_config: Option<TlsConfig>,
}

impl StdTransport {
    pub fn new(wait_connect_timeout_ms: u64, tls_config: Option<TlsConfig>) -> Self {
        Self {
            conns: HashMap::new(),
            next_handle: 1,
            resolved: Vec::new(),
            wait_connect_timeout_ms,
            tls_config,
        }
    }

    fn conn(&mut self, socket: SocketHandle) -> Option<&mut Conn> {
        self.conns.get_mut(&socket)
    }
}

impl Transport for StdTransport {
    fn resolve_start(&mut self, host: &str) -> Result<(), PubNubError> {
        // `std`'s resolver is blocking; there is no separate "in progress"
        // phase to poll here, so `resolve_status` always reports `Done`
        // once this succeeds.
        let addrs: Vec<_> = (host, 0u16)
            .to_socket_addrs()
            .map_err(|e| {
                tracing::warn!(host, error = %e, "dns resolution failed");
                PubNubError::new(ResultCode::AddressResolutionFailed, e.to_string()).with_cause(SocketError::Resolve(e))
            })?
            .map(|a| a.ip())
            .collect();
        if addrs.is_empty() {
            return Err(PubNubError::new(ResultCode::AddressResolutionFailed, "no addresses").with_cause(SocketError::NoAddresses));
        }
        tracing::debug!(host, count = addrs.len(), "resolved host");
        self.resolved = addrs;
        Ok(())
    }

    fn resolve_status(&mut self) -> StepStatus {
        if self.resolved.is_empty() {
            StepStatus::WouldBlock
        } else {
            StepStatus::Done
        }
    }

    fn connect_start(&mut self, _addr: &[u8], port: u16) -> Result<SocketHandle, PubNubError> {
        let ip = *self
            .resolved
            .first()
            .ok_or_else(|| PubNubError::new(ResultCode::AddressResolutionFailed, "connect before resolve"))?;
        let target = std::net::SocketAddr::new(ip, port);
        let domain = if target.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| PubNubError::new(ResultCode::ConnectFailed, e.to_string()).with_cause(SocketError::Connect(e)))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| PubNubError::new(ResultCode::ConnectFailed, e.to_string()).with_cause(SocketError::Connect(e)))?;
        match socket.connect(&target.into()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.raw_os_error() == Some(libc_in_progress()) => {}
            Err(e) => return Err(PubNubError::new(ResultCode::ConnectFailed, e.to_string()).with_cause(SocketError::Connect(e))),
        }
        let stream: TcpStream = socket.into();
        let handle = self.next_handle;
        self.next_handle += 1;
        tracing::debug!(handle, %target, "connecting");
        self.conns.insert(
            handle,
            Conn {
                stream,
                tls: None,
                line_acc: Vec::new(),
                connect_started_at: Instant::now(),
                connected: false,
                closed: false,
            },
        );
        Ok(handle)
    }

    fn connect_status(&mut self, socket: SocketHandle) -> StepStatus {
        let timeout = self.wait_connect_timeout_ms;
        let Some(conn) = self.conn(socket) else { return StepStatus::Timeout };
        if conn.connected {
            return StepStatus::Done;
        }
        match conn.stream.take_error() {
            Ok(None) => {}
            _ => return StepStatus::Timeout,
        }
        // A writable non-blocking socket with no pending error is connected.
        let mut probe = [0u8; 0];
        match conn.stream.write(&probe) {
            Ok(_) => {
                conn.connected = true;
                StepStatus::Done
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if conn.connect_started_at.elapsed().as_millis() as u64 > timeout {
                    tracing::warn!(socket, timeout_ms = timeout, "connect timed out");
                    StepStatus::Timeout
                } else {
                    StepStatus::InProgress
                }
            }
            Err(_) => {
                let _ = &mut probe;
                StepStatus::Timeout
            }
        }
    }

    fn tls_start(&mut self, socket: SocketHandle, sni: &str) -> Result<(), PubNubError> {
        let Some(tls_config) = self.tls_config.clone() else {
            return Err(PubNubError::new(ResultCode::CryptoNotSupported, "tls requested without a TlsConfig"));
        };
        let server_name = ServerName::try_from(sni)
            .map_err(|_| PubNubError::new(ResultCode::InvalidParameters, "invalid TLS server name"))?;
        let client = ClientConnection::new(tls_config.inner, server_name).map_err(|e| {
            tracing::warn!(socket, sni, error = %e, "tls setup failed");
            PubNubError::new(ResultCode::ConnectFailed, e.to_string()).with_cause(SocketError::Tls(e.to_string()))
        })?;
        tracing::debug!(socket, sni, "starting tls handshake");
        if let Some(conn) = self.conn(socket) {
            conn.tls = Some(client);
        }
        Ok(())
    }

    fn tls_status(&mut self, socket: SocketHandle) -> StepStatus {
        let Some(conn) = self.conn(socket) else { return StepStatus::Timeout };
        let Some(tls) = conn.tls.as_mut() else { return StepStatus::Done };
        if !tls.is_handshaking() {
            return StepStatus::Done;
        }
        match tls.complete_io(&mut conn.stream) {
            Ok(_) => {
                if tls.is_handshaking() {
                    StepStatus::InProgress
                } else {
                    StepStatus::Done
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => StepStatus::InProgress,
            Err(_) => StepStatus::Timeout,
        }
    }

    fn send(&mut self, socket: SocketHandle, data: &[u8]) -> Result<usize, PubNubError> {
        let Some(conn) = self.conn(socket) else {
            return Err(PubNubError::new(ResultCode::IoError, "send on unknown socket"));
        };
        let result = match conn.tls.as_mut() {
            Some(tls) => {
                let n = tls
                    .writer()
                    .write(data)
                    .map_err(|e| PubNubError::new(ResultCode::IoError, e.to_string()).with_cause(SocketError::Io(e)))?;
                tls.complete_io(&mut conn.stream)
                    .map_err(|e| PubNubError::new(ResultCode::IoError, e.to_string()))?;
                n
            }
            None => conn
                .stream
                .write(data)
                .map_err(|e| PubNubError::new(ResultCode::IoError, e.to_string()).with_cause(SocketError::Io(e)))?,
        };
        Ok(result)
    }

    fn send_status(&mut self, _socket: SocketHandle) -> StepStatus {
        // `send` above is a single blocking-ish attempt per call; every
        // byte handed to it either went out or the call errored, so the
        // caller always sees `Done` immediately after a successful `send`.
        StepStatus::Done
    }

    fn read_line(&mut self, socket: SocketHandle, buf: &mut [u8]) -> Result<usize, PubNubError> {
        let Some(conn) = self.conn(socket) else {
            return Err(PubNubError::new(ResultCode::IoError, "read on unknown socket"));
        };
        let mut byte = [0u8; 1];
        loop {
            let read_result = match conn.tls.as_mut() {
                Some(tls) => {
                    let _ = tls.complete_io(&mut conn.stream);
                    std::io::Read::read(&mut tls.reader(), &mut byte)
                }
                None => conn.stream.read(&mut byte),
            };
            match read_result {
                Ok(0) => {
                    let n = conn.line_acc.len().min(buf.len());
                    buf[..n].copy_from_slice(&conn.line_acc[..n]);
                    conn.line_acc.clear();
                    return Ok(n);
                }
                Ok(_) => {
                    conn.line_acc.push(byte[0]);
                    if byte[0] == b'\n' {
                        let n = conn.line_acc.len().min(buf.len());
                        buf[..n].copy_from_slice(&conn.line_acc[..n]);
                        conn.line_acc.clear();
                        return Ok(n);
                    }
                    if conn.line_acc.len() >= buf.len() {
                        conn.line_acc.clear();
                        return Ok(0);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(e) => return Err(PubNubError::new(ResultCode::IoError, e.to_string()).with_cause(SocketError::Io(e))),
            }
        }
    }

    fn read_line_status(&mut self, socket: SocketHandle) -> StepStatus {
        match self.conn(socket) {
            Some(conn) if !conn.line_acc.is_empty() => StepStatus::InProgress,
            Some(_) => StepStatus::Done,
            None => StepStatus::Timeout,
        }
    }

    fn read(&mut self, socket: SocketHandle, buf: &mut [u8], n: usize) -> Result<usize, PubNubError> {
        let Some(conn) = self.conn(socket) else {
            return Err(PubNubError::new(ResultCode::IoError, "read on unknown socket"));
        };
        let want = n.min(buf.len());
        let read_result = match conn.tls.as_mut() {
            Some(tls) => {
                let _ = tls.complete_io(&mut conn.stream);
                std::io::Read::read(&mut tls.reader(), &mut buf[..want])
            }
            None => conn.stream.read(&mut buf[..want]),
        };
        match read_result {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(PubNubError::new(ResultCode::IoError, e.to_string()).with_cause(SocketError::Io(e))),
        }
    }

    fn read_status(&mut self, _socket: SocketHandle) -> StepStatus {
        StepStatus::Done
    }

    fn is_closed(&self, socket: SocketHandle) -> bool {
        self.conns.get(&socket).map(|c| c.closed).unwrap_or(true)
    }

    fn close(&mut self, socket: SocketHandle) {
        if let Some(mut conn) = self.conns.remove(&socket) {
            tracing::debug!(socket, "closing connection");
            let _ = conn.stream.shutdown(std::net::Shutdown::Both);
            conn.closed = true;
        }
    }

    fn set_blocking(&mut self, socket: SocketHandle, blocking: bool) {
        if let Some(conn) = self.conn(socket) {
            let _ = conn.stream.set_nonblocking(!blocking);
        }
    }
}

/// `EINPROGRESS`, checked by raw errno since `std::io::ErrorKind` has no
/// portable variant for it.
fn libc_in_progress() -> i32 {
    #[cfg(unix)]
    {
        115 // EINPROGRESS on Linux; other unices define the same value.
    }
    #[cfg(not(unix))]
    {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_transport_has_no_connections() {
        let t = StdTransport::new(5_000, None);
        assert!(t.is_closed(1));
    }
}
