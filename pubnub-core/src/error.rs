//! Unified error domain for the engine.
//!
//! Grounded on the teacher's `SparkError` (a stable `code` plus a message
//! and an optional boxed cause, rather than a `thiserror` variant per call
//! site) and on `pubnub_helper.c`'s result-to-string table from the
//! original C SDK, which supplies the exact taxonomy enumerated in the
//! spec's result taxonomy section.
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// The full result taxonomy a transaction can terminate with.
///
/// Kept as a flat enum (not a tree of error types) because callers need to
/// switch on *kind* to decide whether to retry, re-subscribe from time 0, or
/// surface the server's error body verbatim — exactly the policy the spec's
/// error-handling section calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResultCode {
    Started,
    InProgress,
    Ok,
    AddressResolutionFailed,
    WaitConnectTimeout,
    ConnectFailed,
    ConnectionTimeout,
    Timeout,
    Aborted,
    Cancelled,
    IoError,
    HttpError,
    FormatError,
    SubscribeTimetokenFormatError,
    NoTimetoken,
    NoRegion,
    TxBufferTooSmall,
    RxBufferNotEmpty,
    ReplyTooBig,
    PublishFailed,
    AccessDenied,
    ServerError,
    ChannelRegistryError,
    ObjectsApiError,
    ActionsApiError,
    GrantTokenError,
    RevokeTokenError,
    FetchHistoryError,
    InvalidChannel,
    InvalidParameters,
    OutOfMemory,
    CryptoNotSupported,
    BadCompressionFormat,
    AuthenticationFailed,
    GroupEmpty,
    GotAllActions,
}

impl ResultCode {
    /// Endpoint groups whose transactions are retryable may retry only on
    /// these kinds (spec.md §4.C7); everything else is a terminal outcome.
    pub fn is_retryable_kind(self) -> bool {
        matches!(
            self,
            ResultCode::AddressResolutionFailed
                | ResultCode::WaitConnectTimeout
                | ResultCode::ConnectFailed
                | ResultCode::ConnectionTimeout
                | ResultCode::Timeout
                | ResultCode::Aborted
                | ResultCode::HttpError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Started => "started",
            ResultCode::InProgress => "in-progress",
            ResultCode::Ok => "ok",
            ResultCode::AddressResolutionFailed => "address-resolution-failed",
            ResultCode::WaitConnectTimeout => "wait-connect-timeout",
            ResultCode::ConnectFailed => "connect-failed",
            ResultCode::ConnectionTimeout => "connection-timeout",
            ResultCode::Timeout => "timeout",
            ResultCode::Aborted => "aborted",
            ResultCode::Cancelled => "cancelled",
            ResultCode::IoError => "io-error",
            ResultCode::HttpError => "http-error",
            ResultCode::FormatError => "format-error",
            ResultCode::SubscribeTimetokenFormatError => "subscribe-timetoken-format-error",
            ResultCode::NoTimetoken => "no-timetoken",
            ResultCode::NoRegion => "no-region",
            ResultCode::TxBufferTooSmall => "tx-buffer-too-small",
            ResultCode::RxBufferNotEmpty => "rx-buffer-not-empty",
            ResultCode::ReplyTooBig => "reply-too-big",
            ResultCode::PublishFailed => "publish-failed",
            ResultCode::AccessDenied => "access-denied",
            ResultCode::ServerError => "server-error",
            ResultCode::ChannelRegistryError => "channel-registry-error",
            ResultCode::ObjectsApiError => "objects-api-error",
            ResultCode::ActionsApiError => "actions-api-error",
            ResultCode::GrantTokenError => "grant-token-error",
            ResultCode::RevokeTokenError => "revoke-token-error",
            ResultCode::FetchHistoryError => "fetch-history-error",
            ResultCode::InvalidChannel => "invalid-channel",
            ResultCode::InvalidParameters => "invalid-parameters",
            ResultCode::OutOfMemory => "out-of-memory",
            ResultCode::CryptoNotSupported => "crypto-not-supported",
            ResultCode::BadCompressionFormat => "bad-compression-format",
            ResultCode::AuthenticationFailed => "authentication-failed",
            ResultCode::GroupEmpty => "group-empty",
            ResultCode::GotAllActions => "got-all-actions",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boxed cause, kept `Send + Sync` so a `PubNubError` can cross the
/// sync/callback boundary freely.
pub type ErrorCause = Box<dyn core::error::Error + Send + Sync + 'static>;

/// The single error type crossing every API boundary in this crate.
#[derive(Debug)]
pub struct PubNubError {
    code: ResultCode,
    message: String,
    cause: Option<ErrorCause>,
}

impl PubNubError {
    pub fn new(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl core::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for PubNubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl core::error::Error for PubNubError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn core::error::Error + 'static))
    }
}

pub type Result<T> = core::result::Result<T, PubNubError>;
