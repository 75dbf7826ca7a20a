//! HTTP plumbing for calcfleet workers
//!
//! Builds the axum applications the cluster serves (the per-agent JSON-RPC
//! app and the arithmetic toolkit backend) and supervises their
//! lifecycles: bounded readiness waits on start, graceful shutdown with a
//! forced abort after a deadline on stop.

pub mod app;
pub mod lifecycle;
pub mod toolkit;

pub use app::AgentApp;
pub use lifecycle::{
    spawn_server, start_all, stop_all, stop_server, ServerHandle, ServerSpec,
    SERVER_START_TIMEOUT, SERVER_STOP_TIMEOUT,
};
pub use toolkit::toolkit_router;
