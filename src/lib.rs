//! Authenticated client for the admin console backend.
//!
//! - [`storage`]: durable key/value storage for the session
//! - [`session`]: the operator's credential and identity
//! - [`api`]: HTTP client, middleware pipeline and typed admin endpoints
//! - [`router`]: screen table and authentication guard
//! - [`menu`]: sidebar menu
//! - [`app`]: process-wide wiring

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod menu;
pub mod router;
pub mod session;
pub mod storage;
