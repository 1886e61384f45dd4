use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Heating,
    Ventilation,
    AirConditioner,
    Humidifier,
}

impl EquipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::Heating => "heating",
            EquipmentType::Ventilation => "ventilation",
            EquipmentType::AirConditioner => "air_conditioner",
            EquipmentType::Humidifier => "humidifier",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heating" => Ok(EquipmentType::Heating),
            "ventilation" => Ok(EquipmentType::Ventilation),
            "air_conditioner" => Ok(EquipmentType::AirConditioner),
            "humidifier" => Ok(EquipmentType::Humidifier),
            _ => Err(Error::invalid("equipment type", s)),
        }
    }
}
