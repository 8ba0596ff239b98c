//! Castream - serve local media to cast receivers over HTTP
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod server;
pub mod streaming;
