//! Veille API server library.
//!
//! Exposes config, state, error handling, routes and service wiring so the
//! binary and the integration tests build the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
