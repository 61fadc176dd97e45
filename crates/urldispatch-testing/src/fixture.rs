//! Scoped fake-dispatcher fixture.
//!
//! Setup starts the fake service at the well-known endpoint; teardown,
//! explicit or via drop, releases it again, so no registration leaks
//! into subsequent tests.

use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, OwnedMutexGuard};

use urldispatch_client::UrlDispatchClient;
use urldispatch_core::endpoint;
use urldispatch_core::error::FakeDispatcherError;
use urldispatch_core::tracing::init_tracing;
use urldispatch_service::config::DispatcherConfig;
use urldispatch_service::lifecycle::FakeDispatcherService;

// Only one fake may hold the well-known endpoint per process, so fixtures
// queue here instead of failing each other with AlreadyRunning.
fn fixture_lock() -> Arc<Mutex<()>> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    Arc::clone(LOCK.get_or_init(|| Arc::new(Mutex::new(()))))
}

/// Fake URL dispatcher registered at the well-known endpoint for the
/// lifetime of the owning test.
///
/// Prefer an explicit `teardown().await` at the end of the test for a
/// graceful drain; if the test panics first, the drop guard still aborts
/// the server and releases the endpoint.
pub struct FakeUrlDispatcher {
    service: FakeDispatcherService,
    authority: String,
    _serial: OwnedMutexGuard<()>,
}

impl FakeUrlDispatcher {
    /// Start the fake service and wait until it is ready to receive calls.
    ///
    /// Honors `URL_DISPATCHER_ENDPOINT`; propagates `StartTimeout` and
    /// `AlreadyRunning` unchanged so the test framework reports them as
    /// setup failures, distinct from assertion failures.
    pub async fn setup() -> Result<Self, FakeDispatcherError> {
        init_tracing();
        let serial = fixture_lock().lock_owned().await;

        let mut service = FakeDispatcherService::new(DispatcherConfig::from_env());
        let addr = service.start().await?;

        Ok(Self {
            service,
            authority: addr.to_string(),
            _serial: serial,
        })
    }

    /// `host:port` the fake is listening on. Hand this to subprocesses
    /// via the `URL_DISPATCHER_ENDPOINT` env var.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The fake's endpoint as an `http://` URI.
    pub fn endpoint(&self) -> String {
        endpoint::uri_from_authority(&self.authority)
    }

    /// The URL passed to the most recent dispatch call, via the same IPC
    /// surface real clients use. Fails with `NoCallsRecorded` when no
    /// dispatch has happened yet.
    pub async fn get_last_dispatch_url_call_parameter(
        &self,
    ) -> Result<String, FakeDispatcherError> {
        UrlDispatchClient::lazy(&self.endpoint())
            .last_dispatched_url()
            .await
    }

    /// Gracefully stop the fake and release the endpoint.
    pub async fn teardown(mut self) {
        self.service.stop().await;
    }
}
