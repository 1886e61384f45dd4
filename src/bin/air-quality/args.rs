use std::path::PathBuf;

use air_quality::model::{EquipmentStatus, EquipmentType, ParameterKind};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(about = "Indoor air-quality monitoring and equipment decisions")]
pub struct Args {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// JSON file with threshold bands; built-in standards are used when omitted
    #[arg(long, env = "AIR_QUALITY_THRESHOLDS")]
    pub thresholds: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply database migrations
    Migrate,

    #[command(subcommand)]
    Room(RoomCommand),

    #[command(subcommand)]
    Sensor(SensorCommand),

    #[command(subcommand)]
    Measurement(MeasurementCommand),

    #[command(subcommand)]
    Equipment(EquipmentCommand),

    /// Classify the current state of a room
    Analyze { room_id: i64 },

    /// Compare equipment states with what the room needs
    Efficiency { room_id: i64 },

    /// Decide what auto-mode equipment should do
    Decide {
        room_id: i64,

        /// Apply the actions to the equipment
        #[arg(long)]
        execute: bool,

        /// Store the decision
        #[arg(long)]
        save: bool,
    },

    /// List stored decisions of a room, newest first
    Decisions {
        room_id: i64,

        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Check a proposed equipment configuration given as a JSON array
    EvaluateConfig {
        #[arg(long)]
        room_id: i64,

        #[arg(long)]
        file: PathBuf,
    },

    /// Analysis and efficiency of every room
    Report,
}

#[derive(Debug, Subcommand)]
pub enum RoomCommand {
    Create {
        #[arg(long)]
        name: String,

        /// Floor area in square metres
        #[arg(long)]
        area: f64,

        #[arg(long)]
        description: Option<String>,
    },

    List,

    /// Room details with current state and analysis
    Show { room_id: i64 },

    /// Delete a room and everything in it
    Delete { room_id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum SensorCommand {
    Create {
        #[arg(long)]
        room_id: i64,

        #[arg(long = "type")]
        kind: ParameterKind,

        #[arg(long)]
        location: Option<String>,
    },

    List {
        #[arg(long)]
        room_id: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MeasurementCommand {
    Record {
        #[arg(long)]
        sensor_id: i64,

        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// RFC 3339 timestamp; now when omitted
        #[arg(long)]
        measured_at: Option<DateTime<Utc>>,
    },

    History {
        #[arg(long)]
        sensor_id: i64,

        #[arg(long, default_value_t = 24)]
        hours: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum EquipmentCommand {
    Create {
        #[arg(long)]
        room_id: i64,

        #[arg(long = "type")]
        kind: EquipmentType,

        #[arg(long)]
        name: String,

        /// Rated power in watts
        #[arg(long)]
        power: Option<f64>,
    },

    List {
        #[arg(long)]
        room_id: Option<i64>,
    },

    SetStatus {
        equipment_id: i64,

        #[arg(long)]
        status: EquipmentStatus,

        #[arg(long)]
        auto_mode: Option<bool>,
    },
}
