//! API layer for the guesthouse admin client.
//!
//! Provides the HTTP transport with bearer auth injection, durable token
//! storage, the error taxonomy, and request/response types matching the
//! guesthouse backend API.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;
