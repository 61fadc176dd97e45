//! Test utilities for code that talks to the URL dispatcher.
//!
//! Provides `FakeUrlDispatcher`, a scoped fixture that registers the fake
//! dispatch service at the well-known endpoint for the duration of a test.
//! Import as a dev-dependency only, never in production code.

pub mod fixture;

pub use fixture::FakeUrlDispatcher;
