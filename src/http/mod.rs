//! HTTP server module.
//!
//! Binding is separated from serving so a bind failure surfaces as a
//! distinct startup error before any route is live. The server includes
//! graceful shutdown on SIGTERM/SIGINT with a configurable drain period;
//! TLS is left to the container platform's load balancer.

mod server;
mod shutdown;

pub use server::{bind, serve, start_server, ServerError};
