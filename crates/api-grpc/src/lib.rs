//! # API gRPC
//!
//! gRPC server implementation for LLaMAid.
//!
//! Handles:
//! - gRPC service setup and authentication
//! - Service implementations using `llamaid-core` for annotation and classification
//! - gRPC-specific concerns (interceptors, tonic integration)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

pub use service::{auth_interceptor, pb, LlamaidService};

pub mod service;
