//! Generated gRPC bindings for the URL dispatcher IPC surface.
//!
//! The `.proto` sources live in `proto/` and are compiled by `build.rs`
//! with `protox` (no system `protoc` needed).

pub mod dispatcher {
    include!(concat!(env!("OUT_DIR"), "/dispatcher.rs"));
}
