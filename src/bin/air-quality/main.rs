mod args;

use std::{fs, process::ExitCode};

use air_quality::{
    Error,
    analysis::{EquipmentEfficiency, RoomAnalysis, analyze_room, equipment_efficiency},
    configuration::evaluate_configuration,
    db::{self, PgStore},
    decision::{Decision, ExecutedAction, execute_decision, make_decision},
    model::{
        DecisionCategory, Equipment, EquipmentSpec, NewMeasurement, NewRoom, Room, Sensor,
    },
    state::{CurrentState, SensorCoverage, current_state, sensor_coverage},
    thresholds::Thresholds,
};
use anyhow::{Context as _, Result};
use args::{Args, Command, EquipmentCommand, MeasurementCommand, RoomCommand, SensorCommand};
use chrono::Utc;
use clap::Parser as _;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct RoomDetail {
    room: Room,
    sensors: Vec<Sensor>,
    equipment: Vec<Equipment>,
    current_state: CurrentState,
    analysis: RoomAnalysis,
    sensor_coverage: SensorCoverage,
}

#[derive(Debug, Serialize)]
struct DecisionReport {
    #[serde(flatten)]
    decision: Decision,

    #[serde(skip_serializing_if = "Option::is_none")]
    executed_actions: Option<Vec<ExecutedAction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    decision_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct RoomReport {
    room: Room,
    analysis: RoomAnalysis,
    efficiency: EquipmentEfficiency,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "air_quality=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("{e:#}");
        if e.downcast_ref::<Error>().is_some_and(Error::is_not_found) {
            return ExitCode::from(2);
        }
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let thresholds = match &args.thresholds {
        Some(path) => Thresholds::from_path(path)?,
        None => Thresholds::default(),
    };

    let pool = db::new_pool(&args.database_url).await?;
    let store = PgStore::new(pool.clone());

    match args.command {
        Command::Migrate => {
            db::migrate(&pool).await?;
            info!("migrations applied");
        }

        Command::Room(RoomCommand::Create {
            name,
            area,
            description,
        }) => {
            let room = db::create_room(
                &pool,
                &NewRoom {
                    name,
                    area,
                    description,
                },
            )
            .await?;
            print_json(&room)?;
        }
        Command::Room(RoomCommand::List) => print_json(&db::get_rooms(&pool).await?)?,
        Command::Room(RoomCommand::Show { room_id }) => {
            let room = db::get_room(&pool, room_id)
                .await?
                .ok_or(Error::RoomNotFound(room_id))?;

            let detail = RoomDetail {
                room,
                sensors: db::get_sensors(&pool, Some(room_id)).await?,
                equipment: db::get_equipment(&pool, Some(room_id)).await?,
                current_state: current_state(&store, room_id).await?,
                analysis: analyze_room(&store, &thresholds, room_id).await?,
                sensor_coverage: sensor_coverage(&store, room_id).await?,
            };
            print_json(&detail)?;
        }
        Command::Room(RoomCommand::Delete { room_id }) => {
            db::delete_room(&pool, room_id).await?;
            info!(room_id, "room deleted");
        }

        Command::Sensor(SensorCommand::Create {
            room_id,
            kind,
            location,
        }) => {
            let sensor = db::create_sensor(&pool, room_id, kind, location.as_deref()).await?;
            print_json(&sensor)?;
        }
        Command::Sensor(SensorCommand::List { room_id }) => {
            print_json(&db::get_sensors(&pool, room_id).await?)?
        }

        Command::Measurement(MeasurementCommand::Record {
            sensor_id,
            value,
            measured_at,
        }) => {
            let measurement = db::insert_measurement(
                &pool,
                &NewMeasurement {
                    sensor_id,
                    value,
                    measured_at: measured_at.unwrap_or_else(Utc::now),
                },
            )
            .await?;
            print_json(&measurement)?;
        }
        Command::Measurement(MeasurementCommand::History { sensor_id, hours }) => {
            print_json(&db::get_measurement_history(&pool, sensor_id, hours).await?)?
        }

        Command::Equipment(EquipmentCommand::Create {
            room_id,
            kind,
            name,
            power,
        }) => {
            let spec = EquipmentSpec {
                r#type: kind,
                name,
                power,
            };
            print_json(&db::create_equipment(&pool, room_id, &spec).await?)?;
        }
        Command::Equipment(EquipmentCommand::List { room_id }) => {
            print_json(&db::get_equipment(&pool, room_id).await?)?
        }
        Command::Equipment(EquipmentCommand::SetStatus {
            equipment_id,
            status,
            auto_mode,
        }) => {
            db::update_equipment_status(&pool, equipment_id, status, auto_mode).await?;
            info!(equipment_id, %status, ?auto_mode, "equipment updated");
        }

        Command::Analyze { room_id } => {
            print_json(&analyze_room(&store, &thresholds, room_id).await?)?
        }
        Command::Efficiency { room_id } => {
            print_json(&equipment_efficiency(&store, &thresholds, room_id).await?)?
        }
        Command::Decide {
            room_id,
            execute,
            save,
        } => {
            let decision = make_decision(&store, &thresholds, room_id).await?;

            let executed_actions = if execute {
                Some(execute_decision(&store, &decision).await)
            } else {
                None
            };

            let decision_id = if save {
                let category = if execute {
                    DecisionCategory::Executed
                } else {
                    DecisionCategory::Advisory
                };
                let description = decision.summary(executed_actions.as_deref());
                Some(
                    db::insert_decision(&pool, room_id, category, &description, &decision.actions)
                        .await?,
                )
            } else {
                None
            };

            print_json(&DecisionReport {
                decision,
                executed_actions,
                decision_id,
            })?;
        }
        Command::Decisions { room_id, limit } => {
            print_json(&db::get_decisions(&pool, room_id, limit).await?)?
        }
        Command::EvaluateConfig { room_id, file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to open file: {file:?}"))?;
            let specs: Vec<EquipmentSpec> = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse equipment list: {file:?}"))?;

            print_json(&evaluate_configuration(room_id, &specs))?;
        }
        Command::Report => {
            let mut reports = Vec::new();
            for room in db::get_rooms(&pool).await? {
                let analysis = analyze_room(&store, &thresholds, room.id).await?;
                let efficiency = equipment_efficiency(&store, &thresholds, room.id).await?;
                reports.push(RoomReport {
                    room,
                    analysis,
                    efficiency,
                });
            }
            print_json(&reports)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");

    Ok(())
}
