use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{Error, model::ParameterKind, store::ClimateStore};

/// A latest measurement as returned by storage, tagged with its sensor type.
#[derive(Debug, Clone)]
pub struct LatestReading {
    pub kind: ParameterKind,

    pub value: f64,

    pub measured_at: DateTime<Utc>,

    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub value: f64,

    pub measured_at: DateTime<Utc>,

    pub location: Option<String>,
}

/// The latest reading of each parameter kind in one room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentState {
    slots: [Option<Reading>; 4],
}

impl CurrentState {
    /// Keeps the newest reading per kind. With several sensors of one type in
    /// a room only the single latest reading among them survives.
    pub fn from_readings(readings: impl IntoIterator<Item = LatestReading>) -> Self {
        let mut state = Self::default();

        for r in readings {
            let slot = &mut state.slots[r.kind.index()];
            if let Some(existing) = slot.as_ref()
                && existing.measured_at >= r.measured_at
            {
                continue;
            }

            *slot = Some(Reading {
                value: r.value,
                measured_at: r.measured_at,
                location: r.location,
            });
        }

        state
    }

    pub fn get(&self, kind: ParameterKind) -> Option<&Reading> {
        self.slots[kind.index()].as_ref()
    }

    pub fn set(&mut self, kind: ParameterKind, reading: Option<Reading>) {
        self.slots[kind.index()] = reading;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParameterKind, Option<&Reading>)> {
        ParameterKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}

impl Serialize for CurrentState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (kind, reading) in self.iter() {
            map.serialize_entry(kind.as_str(), &reading)?;
        }
        map.end()
    }
}

pub async fn current_state<S: ClimateStore>(store: &S, room_id: i64) -> Result<CurrentState> {
    ensure_room(store, room_id).await?;

    let readings = store
        .latest_readings(room_id)
        .await
        .with_context(|| format!("failed to get latest readings for room {room_id}"))?;

    Ok(CurrentState::from_readings(readings))
}

/// Which parameter kinds a room has no sensor for.
#[derive(Debug, Clone, Serialize)]
pub struct SensorCoverage {
    pub is_valid: bool,

    pub missing_sensors: Vec<ParameterKind>,
}

pub async fn sensor_coverage<S: ClimateStore>(store: &S, room_id: i64) -> Result<SensorCoverage> {
    ensure_room(store, room_id).await?;

    let sensors = store
        .sensors_by_room(room_id)
        .await
        .with_context(|| format!("failed to get sensors for room {room_id}"))?;

    let missing_sensors: Vec<ParameterKind> = ParameterKind::ALL
        .into_iter()
        .filter(|k| !sensors.iter().any(|s| s.r#type == *k))
        .collect();

    Ok(SensorCoverage {
        is_valid: missing_sensors.is_empty(),
        missing_sensors,
    })
}

pub(crate) async fn ensure_room<S: ClimateStore>(store: &S, room_id: i64) -> Result<()> {
    let room = store
        .room(room_id)
        .await
        .with_context(|| format!("failed to get room {room_id}"))?;

    if room.is_none() {
        bail!(Error::RoomNotFound(room_id));
    }

    Ok(())
}
