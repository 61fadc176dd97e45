//! Shared building blocks for the URL dispatch workspace.
//!
//! Provides the caller-visible error taxonomy, well-known endpoint
//! resolution, and tracing initialization used by the service, the client
//! library, and the test fixture.

pub mod endpoint;
pub mod error;
pub mod tracing;
