use tonic::{Code, Status};

/// Caller-visible error variants for the fake dispatch service.
///
/// Every variant propagates to the driving test unmodified; none are
/// retried or swallowed along the way, since masking them would hide
/// genuine harness bugs.
#[derive(Debug, thiserror::Error)]
pub enum FakeDispatcherError {
    /// The call log was queried before any dispatch occurred.
    #[error("no calls recorded")]
    NoCallsRecorded,
    /// A dispatch method was invoked while the service was not in the
    /// Running state.
    #[error("service is not running")]
    ServiceNotRunning,
    /// `start()` was called while a service already held the well-known
    /// endpoint, or twice on the same instance without an intervening stop.
    #[error("fake dispatcher already running")]
    AlreadyRunning,
    /// The endpoint could not be published within the configured interval.
    #[error("timed out waiting for the dispatch endpoint to publish")]
    StartTimeout,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl FakeDispatcherError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoCallsRecorded => "NO_CALLS_RECORDED",
            Self::ServiceNotRunning => "SERVICE_NOT_RUNNING",
            Self::AlreadyRunning => "ALREADY_RUNNING",
            Self::StartTimeout => "START_TIMEOUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Translate a wire status back into the taxonomy.
    ///
    /// This is the single adapter-level translation rule: the client
    /// library calls it on every failed RPC, so tests see the same variant
    /// the server raised.
    pub fn from_status(status: &Status) -> Self {
        match status.code() {
            Code::NotFound => Self::NoCallsRecorded,
            Code::FailedPrecondition => Self::ServiceNotRunning,
            Code::AlreadyExists => Self::AlreadyRunning,
            Code::DeadlineExceeded => Self::StartTimeout,
            code => Self::Internal(anyhow::anyhow!("{code:?}: {}", status.message())),
        }
    }
}

impl From<FakeDispatcherError> for Status {
    fn from(err: FakeDispatcherError) -> Self {
        let message = err.to_string();
        match err {
            FakeDispatcherError::NoCallsRecorded => Status::not_found(message),
            FakeDispatcherError::ServiceNotRunning => Status::failed_precondition(message),
            FakeDispatcherError::AlreadyRunning => Status::already_exists(message),
            FakeDispatcherError::StartTimeout => Status::deadline_exceeded(message),
            FakeDispatcherError::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
                Status::internal(message)
            }
        }
    }
}
