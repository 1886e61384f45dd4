//! Rule-based equipment decisions.
//!
//! Each parameter rule is evaluated on its own. Two rules may target the same
//! equipment with opposite actions; both actions are kept, and when the
//! decision is executed the last one applied wins.

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    analysis::{RoomAnalysis, analyze_room},
    model::{Equipment, EquipmentStatus, EquipmentType, ParameterKind, ParameterStatus},
    store::ClimateStore,
    thresholds::Thresholds,
};

pub const AIR_QUALITY_NORMAL: &str = "Air quality is normal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TurnOn,
    TurnOff,
}

impl ActionKind {
    pub fn target_status(&self) -> EquipmentStatus {
        match self {
            ActionKind::TurnOn => EquipmentStatus::On,
            ActionKind::TurnOff => EquipmentStatus::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub equipment_id: i64,

    pub equipment_name: String,

    pub action: ActionKind,

    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub room_id: i64,

    pub overall_status: ParameterStatus,

    pub actions: Vec<Action>,

    pub recommendations: Vec<String>,
}

/// Outcome of applying one [`Action`].
#[derive(Debug, Clone, Serialize)]
pub struct ExecutedAction {
    pub equipment_id: i64,

    pub equipment_name: String,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EquipmentStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Decision {
    /// One-line description stored with a decision record.
    pub fn summary(&self, executed: Option<&[ExecutedAction]>) -> String {
        let mut summary = format!(
            "Overall status {}, {} action(s)",
            self.overall_status,
            self.actions.len()
        );

        if let Some(executed) = executed {
            let succeeded = executed.iter().filter(|e| e.success).count();
            summary.push_str(&format!(
                ", {succeeded} succeeded, {} failed",
                executed.len() - succeeded
            ));
        }

        summary
    }
}

fn format_value(analysis: &RoomAnalysis, kind: ParameterKind) -> String {
    match analysis.value(kind) {
        Some(v) => format!("{v}{}", kind.unit()),
        None => "N/A".to_string(),
    }
}

fn push_action(actions: &mut Vec<Action>, eq: &Equipment, action: ActionKind, reason: &str) {
    actions.push(Action {
        equipment_id: eq.id,
        equipment_name: eq.name.clone(),
        action,
        reason: reason.to_string(),
    });
}

/// Turns an analysis into actions for the room's auto-mode equipment.
pub fn decide(analysis: &RoomAnalysis, equipment: &[Equipment]) -> Decision {
    let auto: Vec<&Equipment> = equipment.iter().filter(|e| e.auto_mode).collect();
    let mut actions = Vec::new();

    let temperature = analysis.status(ParameterKind::Temperature);
    let temperature_value = format_value(analysis, ParameterKind::Temperature);
    if temperature.is_low() {
        let reason = format!("Low temperature: {temperature_value}");
        for eq in auto.iter().filter(|e| e.r#type == EquipmentType::Heating) {
            push_action(&mut actions, eq, ActionKind::TurnOn, &reason);
        }
    } else if temperature.is_high() {
        let reason = format!("High temperature: {temperature_value}");
        for eq in &auto {
            match eq.r#type {
                EquipmentType::AirConditioner => {
                    push_action(&mut actions, eq, ActionKind::TurnOn, &reason)
                }
                EquipmentType::Heating if eq.status == EquipmentStatus::On => {
                    push_action(&mut actions, eq, ActionKind::TurnOff, &reason)
                }
                _ => {}
            }
        }
    }

    if analysis.status(ParameterKind::Humidity).is_low() {
        let reason = format!("Low humidity: {}", format_value(analysis, ParameterKind::Humidity));
        for eq in auto.iter().filter(|e| e.r#type == EquipmentType::Humidifier) {
            push_action(&mut actions, eq, ActionKind::TurnOn, &reason);
        }
    }

    let mut pollution = Vec::new();
    if analysis.status(ParameterKind::Co2).is_high() {
        pollution.push(format!("CO2: {}", format_value(analysis, ParameterKind::Co2)));
    }
    if analysis.status(ParameterKind::Dust).is_high() {
        pollution.push(format!("Dust: {}", format_value(analysis, ParameterKind::Dust)));
    }
    if !pollution.is_empty() {
        let reason = pollution.join(", ");
        for eq in auto.iter().filter(|e| e.r#type == EquipmentType::Ventilation) {
            push_action(&mut actions, eq, ActionKind::TurnOn, &reason);
        }
    }

    let recommendations = if analysis.overall_status == ParameterStatus::Optimal {
        vec![AIR_QUALITY_NORMAL.to_string()]
    } else {
        analysis.issues.clone()
    };

    Decision {
        room_id: analysis.room_id,
        overall_status: analysis.overall_status,
        actions,
        recommendations,
    }
}

pub async fn make_decision<S: ClimateStore>(
    store: &S,
    thresholds: &Thresholds,
    room_id: i64,
) -> Result<Decision> {
    let analysis = analyze_room(store, thresholds, room_id).await?;
    let equipment = store
        .equipment_by_room(room_id)
        .await
        .with_context(|| format!("failed to get equipment for room {room_id}"))?;

    let decision = decide(&analysis, &equipment);
    info!(
        room_id,
        overall_status = %decision.overall_status,
        actions = decision.actions.len(),
        "decision made"
    );

    Ok(decision)
}

/// Applies every action in order, one independent write each.
///
/// A failed write is recorded in the returned list and does not stop the
/// remaining actions.
pub async fn execute_decision<S: ClimateStore>(
    store: &S,
    decision: &Decision,
) -> Vec<ExecutedAction> {
    let mut executed = Vec::with_capacity(decision.actions.len());

    for action in &decision.actions {
        let status = action.action.target_status();

        match store.set_equipment_status(action.equipment_id, status).await {
            Ok(()) => {
                debug!(
                    equipment_id = action.equipment_id,
                    %status,
                    "equipment status updated"
                );
                executed.push(ExecutedAction {
                    equipment_id: action.equipment_id,
                    equipment_name: action.equipment_name.clone(),
                    success: true,
                    status: Some(status),
                    error: None,
                });
            }
            Err(err) => {
                warn!(
                    equipment_id = action.equipment_id,
                    %status,
                    "failed to update equipment status: {err:#}"
                );
                executed.push(ExecutedAction {
                    equipment_id: action.equipment_id,
                    equipment_name: action.equipment_name.clone(),
                    success: false,
                    status: None,
                    error: Some(format!("{err:#}")),
                });
            }
        }
    }

    executed
}
