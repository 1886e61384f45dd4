use std::future::Future;

use anyhow::Result;

use crate::{
    model::{Equipment, EquipmentStatus, Room, Sensor},
    state::LatestReading,
};

/// What the analysis and decision pipeline needs from storage.
///
/// [`crate::db::PgStore`] is the production implementation.
pub trait ClimateStore {
    fn room(&self, room_id: i64) -> impl Future<Output = Result<Option<Room>>> + Send;

    fn sensors_by_room(&self, room_id: i64) -> impl Future<Output = Result<Vec<Sensor>>> + Send;

    /// The latest measurement of every sensor type present in the room.
    fn latest_readings(
        &self,
        room_id: i64,
    ) -> impl Future<Output = Result<Vec<LatestReading>>> + Send;

    fn equipment_by_room(
        &self,
        room_id: i64,
    ) -> impl Future<Output = Result<Vec<Equipment>>> + Send;

    fn set_equipment_status(
        &self,
        equipment_id: i64,
        status: EquipmentStatus,
    ) -> impl Future<Output = Result<()>> + Send;
}
