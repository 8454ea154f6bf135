//! Per-host result (C1 §3.2).

use crate::error::OperationError;

/// Phrases a 401 response body is pattern-matched against to decide whether
/// it represents a credential failure specifically, rather than a generic
/// authorization failure. Deliberately a plain list rather than a closed
/// enum (spec §9 open question (c)): implementations extend this without a
/// breaking change.
pub const WRONG_CREDENTIAL_MARKERS: &[&str] = &[
    "wrong password",
    "invalid credentials",
    "authentication failed",
    "bad username or password",
];

/// The coarse outcome classification the dispatcher assigns to a completed
/// (or failed) per-host call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// Transport succeeded and the status code was 2xx.
    Success,
    /// Transport succeeded but the status code was 4xx/5xx.
    Failure,
    /// An I/O error occurred, typically a TLS handshake/verification
    /// failure.
    Exception,
    /// The peer closed the connection before sending headers.
    EofException,
}

/// The outcome of one dispatched request against one host.
#[derive(Debug, Clone)]
pub struct HostResult {
    pub status: ResultStatus,
    pub http_status: u16,
    pub host: String,
    pub body: String,
    pub error: Option<OperationError>,
}

impl HostResult {
    pub fn success(host: impl Into<String>, http_status: u16, body: String) -> Self {
        Self {
            status: ResultStatus::Success,
            http_status,
            host: host.into(),
            body,
            error: None,
        }
    }

    pub fn failure(
        host: impl Into<String>,
        http_status: u16,
        body: String,
        error: OperationError,
    ) -> Self {
        Self {
            status: ResultStatus::Failure,
            http_status,
            host: host.into(),
            body,
            error: Some(error),
        }
    }

    pub fn exception(host: impl Into<String>, error: OperationError) -> Self {
        Self {
            status: ResultStatus::Exception,
            http_status: 0,
            host: host.into(),
            body: String::new(),
            error: Some(error),
        }
    }

    pub fn eof_exception(host: impl Into<String>, error: OperationError) -> Self {
        Self {
            status: ResultStatus::EofException,
            http_status: 0,
            host: host.into(),
            body: String::new(),
            error: Some(error),
        }
    }

    /// `err == nil`.
    pub fn is_passing(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.http_status == 401
    }

    pub fn is_precondition_failed(&self) -> bool {
        self.http_status == 412
    }

    pub fn is_internal_error(&self) -> bool {
        self.http_status == 500
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(OperationError::is_timeout)
    }

    /// "Server up but rejected us" vs. "not up yet": passing, or one of the
    /// three status codes that prove *something* answered on the other end.
    pub fn is_http_running(&self) -> bool {
        self.is_passing()
            || self.is_unauthorized()
            || self.is_precondition_failed()
            || self.is_internal_error()
    }

    /// A 401 whose body matches one of the known credential-failure
    /// phrases, distinguishing "wrong password" from "valid password,
    /// insufficient privilege".
    pub fn is_password_or_cert_error(&self) -> bool {
        if !self.is_unauthorized() {
            return false;
        }
        let body_lower = self.body.to_lowercase();
        WRONG_CREDENTIAL_MARKERS
            .iter()
            .any(|marker| body_lower.contains(marker))
    }
}
