pub mod config;
pub mod grpc_server;
pub mod lifecycle;
pub mod recorder;
pub mod state;
