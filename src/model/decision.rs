use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    /// Actions were recommended but not applied.
    Advisory,
    /// Actions were applied to the equipment.
    Executed,
}

impl DecisionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionCategory::Advisory => "advisory",
            DecisionCategory::Executed => "executed",
        }
    }
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advisory" => Ok(DecisionCategory::Advisory),
            "executed" => Ok(DecisionCategory::Executed),
            _ => Err(Error::invalid("decision category", s)),
        }
    }
}

/// A stored decision. Written for audit, never read back by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub id: i64,

    pub room_id: i64,

    pub category: DecisionCategory,

    pub description: Option<String>,

    pub recommended_actions: serde_json::Value,

    pub created_at: DateTime<Utc>,
}
