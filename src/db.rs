use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};
use tracing::debug;

use crate::{
    Error,
    decision::Action,
    model::{
        DecisionCategory, DecisionRecord, Equipment, EquipmentSpec, EquipmentStatus,
        Measurement, NewMeasurement, NewRoom, ParameterKind, Room, Sensor,
        validate_measurement_value,
    },
    state::LatestReading,
    store::ClimateStore,
};

pub async fn new_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to database")
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to run database migrations")
}

/// Maps a foreign key violation to the missing parent record.
fn parent_not_found(err: sqlx::Error, not_found: Error) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => not_found.into(),
        _ => err.into(),
    }
}

#[derive(Debug, FromRow)]
struct RoomRow {
    id: i64,
    name: String,
    area: f64,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            area: row.area,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SensorRow {
    id: i64,
    room_id: i64,
    sensor_type: String,
    location: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SensorRow> for Sensor {
    type Error = Error;

    fn try_from(row: SensorRow) -> Result<Self, Self::Error> {
        Ok(Sensor {
            id: row.id,
            room_id: row.room_id,
            r#type: row.sensor_type.parse()?,
            location: row.location,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MeasurementRow {
    id: i64,
    sensor_id: i64,
    value: f64,
    measured_at: DateTime<Utc>,
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        Measurement {
            id: row.id,
            sensor_id: row.sensor_id,
            value: row.value,
            measured_at: row.measured_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LatestReadingRow {
    sensor_type: String,
    value: f64,
    measured_at: DateTime<Utc>,
    location: Option<String>,
}

impl TryFrom<LatestReadingRow> for LatestReading {
    type Error = Error;

    fn try_from(row: LatestReadingRow) -> Result<Self, Self::Error> {
        Ok(LatestReading {
            kind: row.sensor_type.parse()?,
            value: row.value,
            measured_at: row.measured_at,
            location: row.location,
        })
    }
}

#[derive(Debug, FromRow)]
struct EquipmentRow {
    id: i64,
    room_id: i64,
    equipment_type: String,
    name: String,
    power: Option<f64>,
    status: String,
    auto_mode: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<EquipmentRow> for Equipment {
    type Error = Error;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        Ok(Equipment {
            id: row.id,
            room_id: row.room_id,
            r#type: row.equipment_type.parse()?,
            name: row.name,
            power: row.power,
            status: row.status.parse()?,
            auto_mode: row.auto_mode,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct DecisionRow {
    id: i64,
    room_id: i64,
    decision_type: String,
    description: Option<String>,
    recommended_actions: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<DecisionRow> for DecisionRecord {
    type Error = Error;

    fn try_from(row: DecisionRow) -> Result<Self, Self::Error> {
        Ok(DecisionRecord {
            id: row.id,
            room_id: row.room_id,
            category: row.decision_type.parse()?,
            description: row.description,
            recommended_actions: row.recommended_actions,
            created_at: row.created_at,
        })
    }
}

pub async fn create_room(pool: &PgPool, room: &NewRoom) -> Result<Room> {
    let row: RoomRow = sqlx::query_as(
        r#"
        INSERT INTO rooms (name, area, description)
        VALUES ($1, $2, $3)
        RETURNING id, name, area, description, created_at
        "#,
    )
    .bind(&room.name)
    .bind(room.area)
    .bind(&room.description)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert room: {}", room.name))?;

    Ok(row.into())
}

pub async fn get_rooms(pool: &PgPool) -> Result<Vec<Room>> {
    let rows: Vec<RoomRow> = sqlx::query_as(
        "SELECT id, name, area, description, created_at FROM rooms ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("failed to select rooms")?;

    Ok(rows.into_iter().map(Room::from).collect())
}

pub async fn get_room(pool: &PgPool, room_id: i64) -> Result<Option<Room>> {
    let row: Option<RoomRow> = sqlx::query_as(
        "SELECT id, name, area, description, created_at FROM rooms WHERE id = $1",
    )
    .bind(room_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to select room {room_id}"))?;

    Ok(row.map(Room::from))
}

/// Deletes a room together with its sensors, measurements, equipment and decisions.
pub async fn delete_room(pool: &PgPool, room_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(room_id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete room {room_id}"))?;

    if result.rows_affected() == 0 {
        bail!(Error::RoomNotFound(room_id));
    }

    Ok(())
}

pub async fn create_sensor(
    pool: &PgPool,
    room_id: i64,
    kind: ParameterKind,
    location: Option<&str>,
) -> Result<Sensor> {
    let row: SensorRow = sqlx::query_as(
        r#"
        INSERT INTO sensors (room_id, sensor_type, location)
        VALUES ($1, $2, $3)
        RETURNING id, room_id, sensor_type, location, status, created_at
        "#,
    )
    .bind(room_id)
    .bind(kind.as_str())
    .bind(location)
    .fetch_one(pool)
    .await
    .map_err(|e| parent_not_found(e, Error::RoomNotFound(room_id)))
    .context("failed to insert sensor")?;

    Ok(Sensor::try_from(row)?)
}

pub async fn get_sensor(pool: &PgPool, sensor_id: i64) -> Result<Option<Sensor>> {
    let row: Option<SensorRow> = sqlx::query_as(
        r#"
        SELECT id, room_id, sensor_type, location, status, created_at
        FROM sensors
        WHERE id = $1
        "#,
    )
    .bind(sensor_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to select sensor {sensor_id}"))?;

    Ok(row.map(Sensor::try_from).transpose()?)
}

pub async fn get_sensors(pool: &PgPool, room_id: Option<i64>) -> Result<Vec<Sensor>> {
    let rows: Vec<SensorRow> = sqlx::query_as(
        r#"
        SELECT s.id, s.room_id, s.sensor_type, s.location, s.status, s.created_at
        FROM sensors s
        JOIN rooms r ON s.room_id = r.id
        WHERE $1::BIGINT IS NULL OR s.room_id = $1
        ORDER BY r.name, s.sensor_type, s.id
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await
    .context("failed to select sensors")?;

    Ok(rows
        .into_iter()
        .map(Sensor::try_from)
        .collect::<Result<_, _>>()?)
}

pub async fn insert_measurement(
    pool: &PgPool,
    measurement: &NewMeasurement,
) -> Result<Measurement> {
    validate_measurement_value(measurement.value)?;

    let row: MeasurementRow = sqlx::query_as(
        r#"
        INSERT INTO measurements (sensor_id, value, measured_at)
        VALUES ($1, $2, $3)
        RETURNING id, sensor_id, value, measured_at
        "#,
    )
    .bind(measurement.sensor_id)
    .bind(measurement.value)
    .bind(measurement.measured_at)
    .fetch_one(pool)
    .await
    .map_err(|e| parent_not_found(e, Error::SensorNotFound(measurement.sensor_id)))
    .context("failed to insert measurement")?;

    Ok(row.into())
}

/// Inserts a batch of measurements in one statement, all or nothing.
pub async fn bulk_insert_measurements(
    pool: &PgPool,
    measurements: &[NewMeasurement],
) -> Result<()> {
    if measurements.is_empty() {
        return Ok(());
    }

    for m in measurements {
        validate_measurement_value(m.value)
            .with_context(|| format!("invalid measurement at {}", m.measured_at))?;
    }

    let sensor_ids: Vec<i64> = measurements.iter().map(|m| m.sensor_id).collect();
    let measured_ats: Vec<DateTime<Utc>> = measurements.iter().map(|m| m.measured_at).collect();
    let values: Vec<f64> = measurements.iter().map(|m| m.value).collect();

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO measurements (sensor_id, measured_at, value)
        SELECT * FROM UNNEST($1::BIGINT[], $2::TIMESTAMPTZ[], $3::FLOAT8[])
        "#,
    )
    .bind(sensor_ids)
    .bind(measured_ats)
    .bind(values)
    .execute(&mut *tx)
    .await
    .context("failed to execute bulk insert query")?;

    tx.commit().await.context("failed to commit transaction")?;

    debug!(count = measurements.len(), "measurements inserted");

    Ok(())
}

/// Start of a history window of `hours` ending at `now`.
fn history_start(now: DateTime<Utc>, hours: u32) -> Result<DateTime<Utc>> {
    match TimeDelta::try_hours(hours.into()).and_then(|window| now.checked_sub_signed(window)) {
        Some(start) => Ok(start),
        None => bail!(Error::invalid("history window", &format!("{hours} hours"))),
    }
}

/// Measurements of one sensor over the trailing `hours`, oldest first.
pub async fn get_measurement_history(
    pool: &PgPool,
    sensor_id: i64,
    hours: u32,
) -> Result<Vec<Measurement>> {
    if get_sensor(pool, sensor_id).await?.is_none() {
        bail!(Error::SensorNotFound(sensor_id));
    }

    let since = history_start(Utc::now(), hours)?;

    let rows: Vec<MeasurementRow> = sqlx::query_as(
        r#"
        SELECT id, sensor_id, value, measured_at
        FROM measurements
        WHERE sensor_id = $1 AND measured_at >= $2
        ORDER BY measured_at ASC
        "#,
    )
    .bind(sensor_id)
    .bind(since)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to select measurement history for sensor {sensor_id}"))?;

    Ok(rows.into_iter().map(Measurement::from).collect())
}

pub async fn get_latest_readings(pool: &PgPool, room_id: i64) -> Result<Vec<LatestReading>> {
    let rows: Vec<LatestReadingRow> = sqlx::query_as(
        r#"
        SELECT DISTINCT ON (s.sensor_type) s.sensor_type, m.value, m.measured_at, s.location
        FROM measurements m
        JOIN sensors s ON m.sensor_id = s.id
        WHERE s.room_id = $1
        ORDER BY s.sensor_type, m.measured_at DESC, m.id DESC
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to select latest readings for room {room_id}"))?;

    Ok(rows
        .into_iter()
        .map(LatestReading::try_from)
        .collect::<Result<_, _>>()?)
}

pub async fn create_equipment(
    pool: &PgPool,
    room_id: i64,
    spec: &EquipmentSpec,
) -> Result<Equipment> {
    let row: EquipmentRow = sqlx::query_as(
        r#"
        INSERT INTO equipment (room_id, equipment_type, name, power)
        VALUES ($1, $2, $3, $4)
        RETURNING id, room_id, equipment_type, name, power, status, auto_mode, created_at
        "#,
    )
    .bind(room_id)
    .bind(spec.r#type.as_str())
    .bind(&spec.name)
    .bind(spec.power)
    .fetch_one(pool)
    .await
    .map_err(|e| parent_not_found(e, Error::RoomNotFound(room_id)))
    .with_context(|| format!("failed to insert equipment: {}", spec.name))?;

    Ok(Equipment::try_from(row)?)
}

pub async fn get_equipment(pool: &PgPool, room_id: Option<i64>) -> Result<Vec<Equipment>> {
    let rows: Vec<EquipmentRow> = sqlx::query_as(
        r#"
        SELECT e.id, e.room_id, e.equipment_type, e.name, e.power, e.status, e.auto_mode,
            e.created_at
        FROM equipment e
        JOIN rooms r ON e.room_id = r.id
        WHERE $1::BIGINT IS NULL OR e.room_id = $1
        ORDER BY r.name, e.equipment_type, e.id
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await
    .context("failed to select equipment")?;

    Ok(rows
        .into_iter()
        .map(Equipment::try_from)
        .collect::<Result<_, _>>()?)
}

/// Sets the status of one equipment item, and its auto-mode flag when given.
pub async fn update_equipment_status(
    pool: &PgPool,
    equipment_id: i64,
    status: EquipmentStatus,
    auto_mode: Option<bool>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE equipment
        SET status = $2, auto_mode = COALESCE($3, auto_mode)
        WHERE id = $1
        "#,
    )
    .bind(equipment_id)
    .bind(status.as_str())
    .bind(auto_mode)
    .execute(pool)
    .await
    .with_context(|| format!("failed to update status of equipment {equipment_id}"))?;

    if result.rows_affected() == 0 {
        bail!(Error::EquipmentNotFound(equipment_id));
    }

    Ok(())
}

pub async fn insert_decision(
    pool: &PgPool,
    room_id: i64,
    category: DecisionCategory,
    description: &str,
    actions: &[Action],
) -> Result<i64> {
    let recommended_actions =
        serde_json::to_value(actions).context("failed to serialize decision actions")?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO decisions (room_id, decision_type, description, recommended_actions)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(room_id)
    .bind(category.as_str())
    .bind(description)
    .bind(recommended_actions)
    .fetch_one(pool)
    .await
    .map_err(|e| parent_not_found(e, Error::RoomNotFound(room_id)))
    .context("failed to insert decision")?;

    Ok(id)
}

pub async fn get_decisions(pool: &PgPool, room_id: i64, limit: i64) -> Result<Vec<DecisionRecord>> {
    let rows: Vec<DecisionRow> = sqlx::query_as(
        r#"
        SELECT id, room_id, decision_type, description, recommended_actions, created_at
        FROM decisions
        WHERE room_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(room_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to select decisions for room {room_id}"))?;

    Ok(rows
        .into_iter()
        .map(DecisionRecord::try_from)
        .collect::<Result<_, _>>()?)
}

/// [`ClimateStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ClimateStore for PgStore {
    async fn room(&self, room_id: i64) -> Result<Option<Room>> {
        get_room(&self.pool, room_id).await
    }

    async fn sensors_by_room(&self, room_id: i64) -> Result<Vec<Sensor>> {
        get_sensors(&self.pool, Some(room_id)).await
    }

    async fn latest_readings(&self, room_id: i64) -> Result<Vec<LatestReading>> {
        get_latest_readings(&self.pool, room_id).await
    }

    async fn equipment_by_room(&self, room_id: i64) -> Result<Vec<Equipment>> {
        get_equipment(&self.pool, Some(room_id)).await
    }

    async fn set_equipment_status(&self, equipment_id: i64, status: EquipmentStatus) -> Result<()> {
        update_equipment_status(&self.pool, equipment_id, status, None).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn history_start_goes_back_by_hours() {
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 8, 0, 0).unwrap();

        assert_eq!(
            history_start(now, 24).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 9, 8, 0, 0).unwrap()
        );
        assert_eq!(history_start(now, 0).unwrap(), now);
    }

    #[test]
    fn oversized_history_window_is_an_error() {
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 8, 0, 0).unwrap();
        let err = history_start(now, u32::MAX).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidValue {
                kind: "history window",
                ..
            })
        ));
    }
}
