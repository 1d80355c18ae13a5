//! HTTP API: router, request context, and middleware.

pub mod app;
pub mod context;
pub mod middleware;
