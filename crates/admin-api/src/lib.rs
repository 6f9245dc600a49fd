//! # Admin API
//!
//! HTTP handlers, auth middleware, DTOs, and the response envelope.

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod state;
