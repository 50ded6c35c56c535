//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` issues requests and owns the bearer token, `error` classifies
//! transport and HTTP failures, and `types` defines the shared wire schema.

pub mod client;
pub mod error;
pub mod types;
