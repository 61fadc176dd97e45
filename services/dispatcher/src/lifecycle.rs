//! Start/stop controller for the fake dispatch service.
//!
//! Owns the Stopped → Starting → Running → Stopping machine, the
//! process-wide claim on the well-known endpoint, and the server task.
//! Designed for scoped acquisition: dropping the controller releases the
//! endpoint even when the owning test never reaches its teardown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use urldispatch_core::error::FakeDispatcherError;
use urldispatch_proto::dispatcher::url_dispatcher_server::UrlDispatcherServer;

use crate::config::DispatcherConfig;
use crate::grpc_server::DispatcherGrpcServer;
use crate::recorder::CallRecorder;
use crate::state::{ServiceShared, ServiceState};

static ENDPOINT_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Ownership token for the well-known endpoint registration.
///
/// At most one claim exists per process; holding it is what entitles a
/// service instance to publish the dispatcher address. Released on drop.
#[derive(Debug)]
struct EndpointClaim(());

impl EndpointClaim {
    fn acquire() -> Result<Self, FakeDispatcherError> {
        if ENDPOINT_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(Self(()))
        } else {
            Err(FakeDispatcherError::AlreadyRunning)
        }
    }
}

impl Drop for EndpointClaim {
    fn drop(&mut self) {
        ENDPOINT_CLAIMED.store(false, Ordering::Release);
    }
}

struct ServerTask {
    handle: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

pub struct FakeDispatcherService {
    config: DispatcherConfig,
    shared: Arc<ServiceShared>,
    claim: Option<EndpointClaim>,
    server: Option<ServerTask>,
    bound_addr: Option<SocketAddr>,
}

impl FakeDispatcherService {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            shared: Arc::new(ServiceShared::new()),
            claim: None,
            server: None,
            bound_addr: None,
        }
    }

    /// Publish the dispatch endpoint and transition to Running.
    ///
    /// Returns the bound address (meaningful when the config requested an
    /// OS-assigned port). Fails with `AlreadyRunning` when this instance is
    /// not Stopped, when another instance holds the endpoint claim, or when
    /// the address is already bound; fails with `StartTimeout` when the
    /// endpoint does not accept connections within the configured interval.
    pub async fn start(&mut self) -> Result<SocketAddr, FakeDispatcherError> {
        if self.shared.state() != ServiceState::Stopped {
            return Err(FakeDispatcherError::AlreadyRunning);
        }
        let claim = EndpointClaim::acquire()?;
        self.shared.set_state(ServiceState::Starting);

        let listener = match bind_within(&self.config.authority, self.config.start_timeout).await
        {
            Ok(listener) => listener,
            Err(e) => {
                self.shared.set_state(ServiceState::Stopped);
                return Err(e);
            }
        };
        let addr = match listener.local_addr().context("read bound address") {
            Ok(addr) => addr,
            Err(e) => {
                self.shared.set_state(ServiceState::Stopped);
                return Err(e.into());
            }
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let grpc = DispatcherGrpcServer {
            shared: Arc::clone(&self.shared),
        };
        let handle = tokio::spawn(async move {
            let served = Server::builder()
                .add_service(UrlDispatcherServer::new(grpc))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "dispatch endpoint terminated");
            }
        });

        if let Err(e) = wait_endpoint_open(addr, self.config.start_timeout).await {
            handle.abort();
            self.shared.set_state(ServiceState::Stopped);
            drop(claim);
            return Err(e);
        }

        self.shared.set_state(ServiceState::Running);
        self.claim = Some(claim);
        self.server = Some(ServerTask {
            handle,
            shutdown: shutdown_tx,
        });
        self.bound_addr = Some(addr);
        tracing::info!(%addr, "fake dispatcher running");
        Ok(addr)
    }

    /// Unpublish the endpoint and transition back to Stopped.
    ///
    /// Waits up to the configured drain timeout for in-flight calls, then
    /// forcibly releases the listener. Safe to call when already stopped;
    /// subsequent calls are no-ops so teardown paths can always run it.
    pub async fn stop(&mut self) {
        if self.shared.state() != ServiceState::Running {
            return;
        }
        self.shared.set_state(ServiceState::Stopping);

        if let Some(ServerTask { handle, shutdown }) = self.server.take() {
            let _ = shutdown.send(());
            let abort = handle.abort_handle();
            if tokio::time::timeout(self.config.drain_timeout, handle)
                .await
                .is_err()
            {
                tracing::warn!("drain timeout expired, releasing the endpoint forcibly");
                abort.abort();
            }
        }

        self.claim = None;
        self.bound_addr = None;
        self.shared.set_state(ServiceState::Stopped);
        tracing::info!("fake dispatcher stopped");
    }

    pub fn state(&self) -> ServiceState {
        self.shared.state()
    }

    /// Address the endpoint is published at, while Running.
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        self.bound_addr
    }

    pub fn recorder(&self) -> &CallRecorder {
        &self.shared.recorder
    }
}

impl Drop for FakeDispatcherService {
    fn drop(&mut self) {
        // Guard path for tests that never reach an explicit stop: kill the
        // server task so the socket closes; the claim token releases itself.
        if let Some(task) = self.server.take() {
            task.handle.abort();
        }
        self.shared.set_state(ServiceState::Stopped);
    }
}

/// Bind `authority`, retrying `AddrInUse` until the timeout elapses.
///
/// A previous service's listener only closes once the runtime reaps its
/// aborted task, so the next start may briefly race the release. In-process
/// conflicts never get here; the endpoint claim rejects them first.
async fn bind_within(
    authority: &str,
    timeout: Duration,
) -> Result<TcpListener, FakeDispatcherError> {
    let deadline = Instant::now() + timeout;
    loop {
        match TcpListener::bind(authority).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                if Instant::now() >= deadline {
                    return Err(FakeDispatcherError::AlreadyRunning);
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Err(e) => {
                let err = anyhow::Error::new(e).context(format!("bind {authority}"));
                return Err(err.into());
            }
        }
    }
}

/// Poll until `addr` accepts a TCP connection or the timeout elapses.
async fn wait_endpoint_open(
    addr: SocketAddr,
    timeout: Duration,
) -> Result<(), FakeDispatcherError> {
    let deadline = Instant::now() + timeout;
    loop {
        if std::net::TcpStream::connect(addr).is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(FakeDispatcherError::StartTimeout);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
