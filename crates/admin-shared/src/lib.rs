//! # Admin Shared
//!
//! Configuration, constants, and telemetry for the admin backend.

pub mod config;
pub mod constants;
pub mod telemetry;
