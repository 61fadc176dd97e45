//! Client library for the dispatcher IPC surface.
//!
//! The command-line tool and the test fixture both go through this crate,
//! so they talk to whichever service (real or fake) currently holds the
//! well-known endpoint.

use anyhow::Context as _;
use tonic::transport::Channel;

use urldispatch_core::endpoint;
use urldispatch_core::error::FakeDispatcherError;
use urldispatch_proto::dispatcher::url_dispatcher_client::UrlDispatcherClient;
use urldispatch_proto::dispatcher::{DispatchUrlRequest, Empty};

#[derive(Clone)]
pub struct UrlDispatchClient {
    client: UrlDispatcherClient<Channel>,
}

impl UrlDispatchClient {
    /// Connect eagerly to `uri` (e.g. `http://127.0.0.1:18520`).
    pub async fn connect(uri: &str) -> Result<Self, FakeDispatcherError> {
        let client = UrlDispatcherClient::connect(uri.to_owned())
            .await
            .context("connect to url-dispatcher endpoint")?;
        Ok(Self { client })
    }

    /// Create a client with lazy connection (connects on first RPC call).
    /// Useful when the service may not be up yet.
    pub fn lazy(uri: &str) -> Self {
        let channel = Channel::from_shared(uri.to_owned())
            .expect("valid URI")
            .connect_lazy();
        Self {
            client: UrlDispatcherClient::new(channel),
        }
    }

    /// Client bound to the well-known dispatcher endpoint.
    pub fn well_known() -> Self {
        Self::lazy(&endpoint::well_known_uri())
    }

    /// Perform one dispatch call.
    pub async fn dispatch(&self, url: &str) -> Result<(), FakeDispatcherError> {
        self.client
            .clone()
            .dispatch_url(DispatchUrlRequest {
                url: url.to_owned(),
            })
            .await
            .map_err(|status| FakeDispatcherError::from_status(&status))?;
        Ok(())
    }

    /// The most recently dispatched URL, per the service's call log.
    pub async fn last_dispatched_url(&self) -> Result<String, FakeDispatcherError> {
        let reply = self
            .client
            .clone()
            .last_dispatched_url(Empty {})
            .await
            .map_err(|status| FakeDispatcherError::from_status(&status))?;
        Ok(reply.into_inner().url)
    }
}
