use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: i64,

    pub name: String,

    /// Floor area in square metres.
    pub area: f64,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub area: f64,
    pub description: Option<String>,
}
