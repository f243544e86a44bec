//! # Desk-API
//!
//! HTTP boundary for the contact-center case assignment service. Handlers
//! are thin: they decode JSON, call [`assignment_core::CaseAssigner`] and map
//! its error taxonomy onto status codes.

pub mod api;

pub use api::{create_router, ApiError, ApiState};
