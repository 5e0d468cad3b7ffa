//! Data models
//!
//! Shared between floor-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod serde_helpers;
pub mod statistics;
pub mod user;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use payment::*;
pub use statistics::*;
pub use user::*;

/// Generic `{message}` response body
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
