use std::sync::Arc;

use tonic::{Request, Response, Status};

use urldispatch_proto::dispatcher::url_dispatcher_server::UrlDispatcher;
use urldispatch_proto::dispatcher::{DispatchCallReply, DispatchUrlRequest, Empty};

use crate::state::ServiceShared;

/// tonic implementation of the dispatcher IPC surface.
///
/// Stands in for the real dispatcher behind the same contract, so client
/// code under test runs unmodified. Every accepted call is recorded and
/// reported as success; URL-to-application resolution never happens here.
#[derive(Clone)]
pub struct DispatcherGrpcServer {
    pub shared: Arc<ServiceShared>,
}

#[tonic::async_trait]
impl UrlDispatcher for DispatcherGrpcServer {
    async fn dispatch_url(
        &self,
        request: Request<DispatchUrlRequest>,
    ) -> Result<Response<Empty>, Status> {
        self.shared.ensure_running()?;

        let url = request.into_inner().url;
        if url.is_empty() {
            return Err(Status::invalid_argument("url must not be empty"));
        }

        // Any scheme passes; there is no whitelist here, unlike the real
        // dispatcher.
        self.shared.recorder.record(&url);
        tracing::debug!(%url, "recorded dispatch");
        Ok(Response::new(Empty {}))
    }

    async fn last_dispatched_url(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<DispatchCallReply>, Status> {
        self.shared.ensure_running()?;

        let call = self.shared.recorder.last()?;
        Ok(Response::new(DispatchCallReply {
            url: call.url,
            dispatched_at: call.dispatched_at.to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use tonic::Code;

    use crate::state::ServiceState;

    use super::*;

    fn running_server() -> DispatcherGrpcServer {
        let shared = Arc::new(ServiceShared::new());
        shared.set_state(ServiceState::Running);
        DispatcherGrpcServer { shared }
    }

    fn dispatch_request(url: &str) -> Request<DispatchUrlRequest> {
        Request::new(DispatchUrlRequest {
            url: url.to_owned(),
        })
    }

    #[tokio::test]
    async fn dispatch_records_the_call_and_succeeds() {
        let server = running_server();
        server
            .dispatch_url(dispatch_request("test://testurl"))
            .await
            .unwrap();

        assert_eq!(server.shared.recorder.len(), 1);
        assert_eq!(server.shared.recorder.last().unwrap().url, "test://testurl");
    }

    #[tokio::test]
    async fn last_dispatched_url_returns_the_most_recent_call() {
        let server = running_server();
        server.dispatch_url(dispatch_request("first://a")).await.unwrap();
        server.dispatch_url(dispatch_request("second://b")).await.unwrap();

        let reply = server
            .last_dispatched_url(Request::new(Empty {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(reply.url, "second://b");
        assert!(!reply.dispatched_at.is_empty());
    }

    #[tokio::test]
    async fn last_dispatched_url_without_calls_is_not_found() {
        let server = running_server();
        let status = server
            .last_dispatched_url(Request::new(Empty {}))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let server = running_server();
        let status = server.dispatch_url(dispatch_request("")).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(server.shared.recorder.is_empty());
    }

    #[tokio::test]
    async fn methods_fail_outside_the_running_state() {
        let shared = Arc::new(ServiceShared::new());
        let server = DispatcherGrpcServer {
            shared: Arc::clone(&shared),
        };

        for state in [
            ServiceState::Stopped,
            ServiceState::Starting,
            ServiceState::Stopping,
        ] {
            shared.set_state(state);

            let status = server
                .dispatch_url(dispatch_request("test://url"))
                .await
                .unwrap_err();
            assert_eq!(status.code(), Code::FailedPrecondition);

            let status = server
                .last_dispatched_url(Request::new(Empty {}))
                .await
                .unwrap_err();
            assert_eq!(status.code(), Code::FailedPrecondition);
        }

        assert!(shared.recorder.is_empty());
    }

    #[tokio::test]
    async fn unusual_schemes_are_accepted() {
        let server = running_server();
        for url in ["mailto:user@example.com", "weird+scheme-x://thing", "a:b"] {
            server.dispatch_url(dispatch_request(url)).await.unwrap();
        }
        assert_eq!(server.shared.recorder.len(), 3);
        assert_eq!(server.shared.recorder.last().unwrap().url, "a:b");
    }
}
