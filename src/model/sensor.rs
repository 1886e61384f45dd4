use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Error, model::ParameterKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Active,
    Inactive,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Active => "active",
            SensorStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for SensorStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SensorStatus::Active),
            "inactive" => Ok(SensorStatus::Inactive),
            _ => Err(Error::invalid("sensor status", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Sensor {
    pub id: i64,

    pub room_id: i64,

    pub r#type: ParameterKind,

    pub location: Option<String>,

    pub status: SensorStatus,

    pub created_at: DateTime<Utc>,
}
