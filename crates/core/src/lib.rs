//! Shared domain types for the Atelier client SDK.
//!
//! Credentials, worker filters, service catalog entries, job
//! configuration payloads, and the configuration structs injected into
//! the gateway and relay clients.

pub mod config;
pub mod error;
pub mod job;
pub mod types;
