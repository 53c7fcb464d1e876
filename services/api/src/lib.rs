//! services/api/src/lib.rs
//!
//! The school portal HTTP service: configuration, adapters for the managed
//! identity and data platform, and the axum handlers.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
