// Infrastructure layer: gRPC transport

pub mod server;

pub use server::{start_server, ServerConfig};
