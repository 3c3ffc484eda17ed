//! Data Transfer Objects for responses that are not plain records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::persistence::PoolStatus;

/// Response body for `POST` (201 Created).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    /// Confirmation text, e.g. `"Customer created successfully"`.
    pub message: String,
    /// Generated identifier of the new row.
    pub id: Option<i64>,
}

/// Response body for a seller `DELETE`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
}

/// Pool counters as reported by `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PoolStatusDto {
    /// Configured limit.
    pub max_connections: u32,
    /// Slots free right now.
    pub available: u32,
    /// Handles checked out.
    pub in_use: u32,
    /// Connections parked for reuse.
    pub idle: u32,
}

impl From<PoolStatus> for PoolStatusDto {
    fn from(status: PoolStatus) -> Self {
        Self {
            max_connections: status.max_connections,
            available: status.available,
            in_use: status.in_use,
            idle: status.idle,
        }
    }
}

/// Response body for `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// `"ok"`, or `"closed"` once shutdown has begun.
    pub status: String,
    /// Service name (`customer` or `seller`).
    pub service: String,
    /// Crate version.
    pub version: String,
    /// Server time of the snapshot.
    pub timestamp: DateTime<Utc>,
    /// Pool counters.
    pub pool: PoolStatusDto,
}
