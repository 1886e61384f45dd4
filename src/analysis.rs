//! Room air-quality analysis and equipment efficiency evaluation.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    model::{Equipment, EquipmentStatus, EquipmentType, ParameterKind, ParameterStatus},
    state::{CurrentState, current_state},
    store::ClimateStore,
    thresholds::Thresholds,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    pub status: ParameterStatus,

    pub message: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<DateTime<Utc>>,
}

impl ParameterAssessment {
    fn no_data() -> Self {
        Self {
            value: None,
            status: ParameterStatus::NoData,
            message: ParameterStatus::NoData.message(),
            measured_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomAnalysis {
    pub room_id: i64,

    pub parameters: IndexMap<ParameterKind, ParameterAssessment>,

    pub overall_status: ParameterStatus,

    pub issues: Vec<String>,
}

impl RoomAnalysis {
    pub fn status(&self, kind: ParameterKind) -> ParameterStatus {
        self.parameters
            .get(&kind)
            .map_or(ParameterStatus::NoData, |p| p.status)
    }

    pub fn value(&self, kind: ParameterKind) -> Option<f64> {
        self.parameters.get(&kind).and_then(|p| p.value)
    }
}

/// Classifies every parameter of `state` and folds them into an overall status.
///
/// The overall status is the first worst status by priority. Parameters with
/// no data are reported as issues but never change the overall status.
pub fn analyze_state(thresholds: &Thresholds, room_id: i64, state: &CurrentState) -> RoomAnalysis {
    let mut analysis = RoomAnalysis {
        room_id,
        parameters: IndexMap::new(),
        overall_status: ParameterStatus::Optimal,
        issues: Vec::new(),
    };

    for (kind, reading) in state.iter() {
        let Some(reading) = reading else {
            analysis.parameters.insert(kind, ParameterAssessment::no_data());
            analysis.issues.push(format!("No data for {kind}"));
            continue;
        };

        let status = thresholds.classify(kind, reading.value);
        analysis.parameters.insert(
            kind,
            ParameterAssessment {
                value: Some(reading.value),
                status,
                message: status.message(),
                measured_at: Some(reading.measured_at),
            },
        );

        if status.priority() > analysis.overall_status.priority() {
            analysis.overall_status = status;
        }

        if !status.is_satisfactory() {
            analysis.issues.push(format!(
                "{}: {}",
                kind.as_str().to_uppercase(),
                status.message()
            ));
        }
    }

    analysis
}

pub async fn analyze_room<S: ClimateStore>(
    store: &S,
    thresholds: &Thresholds,
    room_id: i64,
) -> Result<RoomAnalysis> {
    let state = current_state(store, room_id)
        .await
        .context("failed to collect current state")?;

    Ok(analyze_state(thresholds, room_id, &state))
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentEfficiency {
    pub total_equipment: usize,

    pub active_equipment: usize,

    pub recommendations: Vec<String>,
}

/// Compares what each piece of equipment is doing with what the room needs.
pub fn evaluate_efficiency(
    analysis: &RoomAnalysis,
    equipment: &[Equipment],
) -> EquipmentEfficiency {
    let temperature = analysis.status(ParameterKind::Temperature);
    let humidity = analysis.status(ParameterKind::Humidity);
    let air_polluted = analysis.status(ParameterKind::Co2).is_high()
        || analysis.status(ParameterKind::Dust).is_high();

    let mut recommendations = Vec::new();
    for eq in equipment {
        let off = eq.status == EquipmentStatus::Off;
        let on = eq.status == EquipmentStatus::On;

        let turn_on = match eq.r#type {
            EquipmentType::Heating => {
                if temperature.is_low() && off {
                    Some(true)
                } else if temperature.is_high() && on {
                    Some(false)
                } else {
                    None
                }
            }
            EquipmentType::AirConditioner => (temperature.is_high() && off).then_some(true),
            EquipmentType::Humidifier => (humidity.is_low() && off).then_some(true),
            EquipmentType::Ventilation => (air_polluted && off).then_some(true),
        };

        match turn_on {
            Some(true) => recommendations.push(format!("Turning on {} is recommended", eq.name)),
            Some(false) => recommendations.push(format!("Turning off {} is recommended", eq.name)),
            None => {}
        }
    }

    EquipmentEfficiency {
        total_equipment: equipment.len(),
        active_equipment: equipment
            .iter()
            .filter(|e| e.status == EquipmentStatus::On)
            .count(),
        recommendations,
    }
}

pub async fn equipment_efficiency<S: ClimateStore>(
    store: &S,
    thresholds: &Thresholds,
    room_id: i64,
) -> Result<EquipmentEfficiency> {
    let analysis = analyze_room(store, thresholds, room_id).await?;
    let equipment = store
        .equipment_by_room(room_id)
        .await
        .with_context(|| format!("failed to get equipment for room {room_id}"))?;

    Ok(evaluate_efficiency(&analysis, &equipment))
}
