//! Intake API.
//!
//! Exposes the intake workflow as JSON endpoints for the dashboard and
//! per-patient screens. Routes are nested under `/api/`.
//!
//! The router is composable — `intake_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::intake_api_router;
pub use server::{ApiServer, ApiSession};
pub use types::ApiContext;
