//! Dining Table Model

use super::serde_helpers;
use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Table occupancy status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TableStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(TableStatus::Available),
            "occupied" => Ok(TableStatus::Occupied),
            "reserved" => Ok(TableStatus::Reserved),
            other => Err(AppError::with_message(
                ErrorCode::InvalidTableStatus,
                "Invalid status. Must be one of: available, occupied, reserved",
            )
            .with_detail("status", other)),
        }
    }
}

/// Dining table with the assigned server's name (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub number: i64,
    pub capacity: i64,
    pub status: TableStatus,
    pub x_position: i64,
    pub y_position: i64,
    pub server_id: Option<i64>,
    pub server_name: Option<String>,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: i64,
    pub capacity: i64,
    pub status: Option<String>,
    pub x_position: Option<i64>,
    pub y_position: Option<i64>,
    pub server_id: Option<i64>,
}

/// Update dining table payload
///
/// `server_id`: 缺失表示不修改，`null` 表示取消分配
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub number: Option<i64>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
    pub x_position: Option<i64>,
    pub y_position: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "serde_helpers::double_option"
    )]
    pub server_id: Option<Option<i64>>,
}

/// PUT /api/tables/{id}/status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: String,
}

/// PUT /api/tables/{id}/server payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerAssignment {
    pub server_id: Option<i64>,
}
