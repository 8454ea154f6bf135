//! Error taxonomy for the operation engine

use thiserror::Error;

/// The kinds of failure an operation, the dispatcher, or the engine can
/// surface. Maps directly onto the error kinds enumerated in the operation
/// engine specification: validation, unreachable host, authentication,
/// transport timeout, TLS exception, protocol error, server error, quorum
/// failure, and domain error.
#[derive(Error, Debug, Clone)]
pub enum OperationError {
    /// User input failed local checks before any request was built.
    #[error("validation error: {0}")]
    Validation(String),

    /// A pre-flight health probe found the host unreachable.
    #[error("host {host} is unreachable: {reason}")]
    UnreachableHost { host: String, reason: String },

    /// A 401 whose body matched a recognised credential-failure phrase.
    #[error("authentication failed on host {host}: {message}")]
    Authentication { host: String, message: String },

    /// The per-request timeout elapsed before a response arrived.
    #[error("request to host {host} timed out after {timeout_secs}s")]
    Timeout { host: String, timeout_secs: u64 },

    /// TLS handshake or certificate verification failed.
    #[error("TLS error contacting host {host}: {message}")]
    Tls { host: String, message: String },

    /// A 2xx body failed to parse, or was missing a required field.
    #[error("failed to parse response from host {host}: {message}")]
    Protocol { host: String, message: String },

    /// A non-2xx, non-401 response.
    #[error("host {host} returned HTTP {code}: {message}")]
    Server {
        host: String,
        code: u16,
        message: String,
    },

    /// Aggregated success count fell below the quorum threshold.
    #[error(
        "quorum not met for operation {operation}: {successes} of {total} primaries succeeded (need {required})"
    )]
    Quorum {
        operation: String,
        successes: usize,
        total: usize,
        required: usize,
    },

    /// A well-formed 2xx response whose content violates a policy invariant.
    #[error("operation {operation} rejected by policy: {message}")]
    Domain { operation: String, message: String },

    /// One or more hosts in a join-all fan-out failed; carries every
    /// per-host error so the caller can report all of them at once.
    #[error("{} host(s) failed in operation {operation}: {}", .failures.len(), join_messages(.failures))]
    Joined {
        operation: String,
        failures: Vec<(String, Box<OperationError>)>,
    },

    /// A polling operation exceeded its timeout without a done verdict.
    #[error(
        "operation {operation} timed out after {timeout_secs}s waiting on host(s): {}",
        .pending_hosts.join(", ")
    )]
    PollingTimeout {
        operation: String,
        timeout_secs: u64,
        pending_hosts: Vec<String>,
    },
}

fn join_messages(failures: &[(String, Box<OperationError>)]) -> String {
    failures
        .iter()
        .map(|(host, err)| format!("{host}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl OperationError {
    /// Join a non-empty set of per-host failures into a single error,
    /// collapsing to the sole error when there's exactly one (so a
    /// join-all operation with a single failing host doesn't read as a
    /// one-element aggregate).
    pub fn join(operation: impl Into<String>, mut failures: Vec<(String, OperationError)>) -> Self {
        if failures.len() == 1 {
            let (_, err) = failures.remove(0);
            return err;
        }
        OperationError::Joined {
            operation: operation.into(),
            failures: failures
                .into_iter()
                .map(|(h, e)| (h, Box::new(e)))
                .collect(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, OperationError::Authentication { .. })
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            OperationError::Timeout { .. } => true,
            OperationError::Joined { failures, .. } => failures.iter().any(|(_, e)| e.is_timeout()),
            _ => false,
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, OperationError::Tls { .. })
    }

    pub fn is_quorum(&self) -> bool {
        matches!(self, OperationError::Quorum { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, OperationError::Protocol { .. })
    }

    /// Names of every host implicated in this error, flattening `Joined`.
    pub fn hosts(&self) -> Vec<String> {
        match self {
            OperationError::UnreachableHost { host, .. }
            | OperationError::Authentication { host, .. }
            | OperationError::Timeout { host, .. }
            | OperationError::Tls { host, .. }
            | OperationError::Protocol { host, .. }
            | OperationError::Server { host, .. } => vec![host.clone()],
            OperationError::Joined { failures, .. } => {
                failures.iter().map(|(h, _)| h.clone()).collect()
            }
            OperationError::PollingTimeout { pending_hosts, .. } => pending_hosts.clone(),
            OperationError::Validation(_)
            | OperationError::Quorum { .. }
            | OperationError::Domain { .. } => Vec::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OperationError>;
