use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EquipmentStatus, EquipmentType};

#[derive(Debug, Clone, Serialize)]
pub struct Equipment {
    pub id: i64,

    pub room_id: i64,

    pub r#type: EquipmentType,

    pub name: String,

    /// Rated power in watts.
    pub power: Option<f64>,

    pub status: EquipmentStatus,

    pub auto_mode: bool,

    pub created_at: DateTime<Utc>,
}

/// Equipment proposed for a room, before anything is installed.
#[derive(Debug, Clone, Deserialize)]
pub struct EquipmentSpec {
    pub r#type: EquipmentType,

    pub name: String,

    #[serde(default)]
    pub power: Option<f64>,
}
