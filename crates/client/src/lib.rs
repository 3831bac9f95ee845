//! Atelier client façade.
//!
//! Ties the gateway and relay crates together into the public SDK
//! surface: construct a [`Client`] with credentials, submit jobs
//! against catalog services, and bind callbacks to asynchronous job
//! results.

pub mod catalog;
pub mod client;
pub mod error;

pub use client::{Client, ClientConfig};
pub use error::ClientError;

// The handle callers use to manage result subscriptions.
pub use atelier_relay::subscriber::Subscription;
