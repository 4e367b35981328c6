//! Bearer-token authentication and claims-based authorization for an axum service.
//!
//! Startup builds an immutable [`services::auth::AuthService`] from
//! `JwtIssuerOptions:*` configuration; each request then runs
//! authenticate (401 on failure) followed by the route's named policy
//! (403 on failure).

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
