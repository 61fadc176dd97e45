use std::sync::{Mutex, PoisonError};

use urldispatch_core::error::FakeDispatcherError;

use crate::recorder::CallRecorder;

/// Lifecycle states of the fake dispatch service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// State shared between the lifecycle controller and the request handlers.
///
/// The call log lives here so it has exactly one owner per service
/// lifetime, and the state flag gates every IPC method.
#[derive(Debug)]
pub struct ServiceShared {
    state: Mutex<ServiceState>,
    pub recorder: CallRecorder,
}

impl Default for ServiceShared {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceShared {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServiceState::Stopped),
            recorder: CallRecorder::new(),
        }
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, next: ServiceState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Dispatch methods are only valid while Running.
    pub fn ensure_running(&self) -> Result<(), FakeDispatcherError> {
        if self.state() == ServiceState::Running {
            Ok(())
        } else {
            Err(FakeDispatcherError::ServiceNotRunning)
        }
    }
}
