use serde::Serialize;

use crate::model::{EquipmentSpec, EquipmentType};

/// Devices rated below this many watts are flagged as underpowered.
pub const LOW_POWER_THRESHOLD_W: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteLevel {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationNote {
    #[serde(rename = "type")]
    pub level: NoteLevel,

    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationEvaluation {
    pub room_id: i64,

    pub is_valid: bool,

    pub recommendations: Vec<ConfigurationNote>,
}

fn note(level: NoteLevel, message: impl Into<String>) -> ConfigurationNote {
    ConfigurationNote {
        level,
        message: message.into(),
    }
}

/// Checks a proposed equipment set for a room. Nothing is read or written.
pub fn evaluate_configuration(
    room_id: i64,
    equipment: &[EquipmentSpec],
) -> ConfigurationEvaluation {
    let has = |t: EquipmentType| equipment.iter().any(|e| e.r#type == t);

    let mut recommendations = Vec::new();

    if !has(EquipmentType::Heating) && !has(EquipmentType::AirConditioner) {
        recommendations.push(note(NoteLevel::Warning, "No temperature control equipment"));
    }

    if !has(EquipmentType::Ventilation) {
        recommendations.push(note(NoteLevel::Warning, "No ventilation equipment"));
    }

    if !has(EquipmentType::Humidifier) {
        recommendations.push(note(NoteLevel::Info, "Consider adding a humidifier"));
    }

    for eq in equipment {
        // Zero means the rating was left blank.
        if let Some(power) = eq.power
            && power != 0.0
            && power < LOW_POWER_THRESHOLD_W
        {
            recommendations.push(note(
                NoteLevel::Warning,
                format!("Low power for {}: {power}W", eq.name),
            ));
        }
    }

    ConfigurationEvaluation {
        room_id,
        is_valid: !recommendations
            .iter()
            .any(|n| n.level == NoteLevel::Warning),
        recommendations,
    }
}
