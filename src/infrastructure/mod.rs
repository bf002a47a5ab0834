//! Infrastructure layer modules
//!
//! This module contains shared infrastructure components:
//! - `auth`: Basic credentials parsing, password policy and hashing
//! - `config`: Application configuration and settings
//! - `error`: Unified error types
//! - `metrics`: Prometheus metrics helpers
//! - `postgres`: PostgreSQL connection pool and migrations

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
