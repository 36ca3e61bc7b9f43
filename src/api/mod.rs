//! Authenticated client for the admin backend.
//!
//! - [`client`]: the process-wide HTTP client and its transport.
//! - [`middleware`]: request/response stages: bearer credential and the
//!   auth-failure funnel.
//! - [`endpoints`]: [`AdminApi`], one typed method per backend operation.
//! - [`types`]: request and response bodies.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod types;

pub use client::{ApiResponse, HttpClient, Method, OutboundRequest, Transport, UreqTransport};
pub use endpoints::AdminApi;
pub use error::ApiError;
