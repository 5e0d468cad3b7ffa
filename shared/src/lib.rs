//! Shared types for the floor server
//!
//! Error codes, API response structures and the domain models exchanged
//! between the server and its clients.

pub mod error;
pub mod live;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
