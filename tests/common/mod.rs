use std::{collections::HashSet, sync::Mutex};

use air_quality::{
    Error,
    model::{
        Equipment, EquipmentStatus, EquipmentType, ParameterKind, Room, Sensor, SensorStatus,
    },
    state::LatestReading,
    store::ClimateStore,
};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, TimeZone as _, Utc};

#[derive(Default)]
struct Inner {
    rooms: Vec<Room>,
    sensors: Vec<Sensor>,
    readings: Vec<(i64, f64, DateTime<Utc>)>,
    equipment: Vec<Equipment>,
    failing: HashSet<i64>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store for pipeline tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 20, hour, minute, 0).unwrap()
}

impl MemoryStore {
    pub fn add_room(&self, name: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.rooms.push(Room {
            id,
            name: name.to_string(),
            area: 40.0,
            description: None,
            created_at: at(0, 0),
        });
        id
    }

    pub fn add_sensor(&self, room_id: i64, kind: ParameterKind, location: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.sensors.push(Sensor {
            id,
            room_id,
            r#type: kind,
            location: Some(location.to_string()),
            status: SensorStatus::Active,
            created_at: at(0, 0),
        });
        id
    }

    pub fn add_reading(&self, sensor_id: i64, value: f64, measured_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        inner.readings.push((sensor_id, value, measured_at));
    }

    pub fn add_equipment(
        &self,
        room_id: i64,
        r#type: EquipmentType,
        name: &str,
        status: EquipmentStatus,
        auto_mode: bool,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.equipment.push(Equipment {
            id,
            room_id,
            r#type,
            name: name.to_string(),
            power: Some(1500.0),
            status,
            auto_mode,
            created_at: at(0, 0),
        });
        id
    }

    /// Makes every status update of `equipment_id` fail.
    pub fn fail_updates_of(&self, equipment_id: i64) {
        self.inner.lock().unwrap().failing.insert(equipment_id);
    }

    pub fn remove_equipment(&self, equipment_id: i64) {
        self.inner
            .lock()
            .unwrap()
            .equipment
            .retain(|e| e.id != equipment_id);
    }

    pub fn status_of(&self, equipment_id: i64) -> EquipmentStatus {
        self.inner
            .lock()
            .unwrap()
            .equipment
            .iter()
            .find(|e| e.id == equipment_id)
            .map(|e| e.status)
            .unwrap()
    }
}

impl ClimateStore for MemoryStore {
    async fn room(&self, room_id: i64) -> Result<Option<Room>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rooms.iter().find(|r| r.id == room_id).cloned())
    }

    async fn sensors_by_room(&self, room_id: i64) -> Result<Vec<Sensor>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sensors
            .iter()
            .filter(|s| s.room_id == room_id)
            .cloned()
            .collect())
    }

    // Returns every reading; the aggregator is expected to keep the newest.
    async fn latest_readings(&self, room_id: i64) -> Result<Vec<LatestReading>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .readings
            .iter()
            .filter_map(|&(sensor_id, value, measured_at)| {
                let sensor = inner
                    .sensors
                    .iter()
                    .find(|s| s.id == sensor_id && s.room_id == room_id)?;
                Some(LatestReading {
                    kind: sensor.r#type,
                    value,
                    measured_at,
                    location: sensor.location.clone(),
                })
            })
            .collect())
    }

    async fn equipment_by_room(&self, room_id: i64) -> Result<Vec<Equipment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .equipment
            .iter()
            .filter(|e| e.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn set_equipment_status(&self, equipment_id: i64, status: EquipmentStatus) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing.contains(&equipment_id) {
            return Err(anyhow!("connection reset while updating {equipment_id}"));
        }

        let Some(eq) = inner.equipment.iter_mut().find(|e| e.id == equipment_id) else {
            bail!(Error::EquipmentNotFound(equipment_id));
        };
        eq.status = status;

        Ok(())
    }
}
