//! The error taxonomy shared by every crate in the quantum execution core.

use std::time::Duration;
use thiserror::Error;

/// Every fallible operation in the core returns this type. There is
/// deliberately one enum for the whole workspace rather than one per crate:
/// recovery policy (retry, fail the job, surface immediately) is a property
/// of the *kind* of error, not of which layer raised it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    /// Construction-time violation of a circuit invariant.
    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Algorithmic precondition failure (e.g. Shor with `gcd(a, N) != 1`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Simulator capacity exceeded (`width > MAX_SIM_QUBITS`).
    #[error("circuit too large for simulation")]
    CircuitTooLarge,

    /// A provider cannot realise the named gate.
    #[error("unsupported gate: {0}")]
    UnsupportedGate(String),

    /// No device registered under this name.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Auto-selection found no device satisfying the policy.
    #[error("no suitable device for policy {0}")]
    NoSuitableDevice(String),

    /// Provider unreachable; `retryable` distinguishes transient network
    /// failure from a permanent condition.
    #[error("provider unavailable (retryable={retryable})")]
    ProviderUnavailable {
        /// Whether the background poller should retry this submission.
        retryable: bool,
    },

    /// Credentials rejected; not retried without `register_provider` again.
    #[error("provider unauthorized")]
    ProviderUnauthorized,

    /// Rate limited; retry no sooner than `retry_after`.
    #[error("provider throttled, retry after {retry_after:?}")]
    ProviderThrottled {
        /// Minimum backoff the provider asked for.
        retry_after: Duration,
    },

    /// The targeted device went offline after the job was queued.
    #[error("device offline: {0}")]
    DeviceOffline(String),

    /// The simulator detected a non-finite or norm-violating amplitude.
    #[error("numeric error: {0}")]
    NumericError(String),

    /// `MAX_INFLIGHT_JOBS` reached.
    #[error("resource exhausted")]
    ResourceExhausted,

    /// `await_result` expired before the job reached a terminal state.
    #[error("timeout")]
    Timeout,

    /// The job was cancelled.
    #[error("cancelled")]
    Cancelled,
}

impl ErrorKind {
    /// Whether the dispatcher's background poller should retry the
    /// operation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::ProviderUnavailable { retryable: true } | ErrorKind::ProviderThrottled { .. }
        )
    }
}

/// Result alias used throughout the core.
pub type CoreResult<T> = Result<T, ErrorKind>;
