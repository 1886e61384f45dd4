use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    On,
    Off,
    Maintenance,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::On => "on",
            EquipmentStatus::Off => "off",
            EquipmentStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(EquipmentStatus::On),
            "off" => Ok(EquipmentStatus::Off),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            _ => Err(Error::invalid("equipment status", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EquipmentType;

    #[test]
    fn rejects_unknown_status() {
        let err = "standby".parse::<EquipmentStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid equipment status: standby");
    }

    #[test]
    fn equipment_type_uses_snake_case_names() {
        assert_eq!(
            "air_conditioner".parse::<EquipmentType>().unwrap(),
            EquipmentType::AirConditioner
        );
        assert_eq!(EquipmentType::AirConditioner.as_str(), "air_conditioner");
        assert!("fan".parse::<EquipmentType>().is_err());
    }
}
