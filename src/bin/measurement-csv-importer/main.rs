mod args;
mod csv;

use std::fs::File;

use air_quality::{Error, db};
use anyhow::Context as _;
use args::Args;
use clap::Parser as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::csv::CsvMeasurementIter;

const BULK_INSERT_SIZE: usize = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "air_quality=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let pool = db::new_pool(&args.database_url).await?;

    let sensor = db::get_sensor(&pool, args.sensor_id)
        .await?
        .ok_or(Error::SensorNotFound(args.sensor_id))?;

    let file =
        File::open(&args.file).with_context(|| format!("failed to open file: {:?}", args.file))?;
    let iter = CsvMeasurementIter::new(file, sensor.id, sensor.r#type, args.timezone)
        .context("failed to create CSV measurement iterator")?;

    let mut buffer = Vec::with_capacity(BULK_INSERT_SIZE);
    let mut total = 0;

    for result in iter {
        let record = result.context("failed to parse CSV record")?;
        buffer.push(record);

        if buffer.len() >= BULK_INSERT_SIZE {
            db::bulk_insert_measurements(&pool, &buffer)
                .await
                .context("failed to bulk insert measurements")?;
            total += buffer.len();
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        db::bulk_insert_measurements(&pool, &buffer)
            .await
            .context("failed to bulk insert remaining measurements")?;
        total += buffer.len();
    }

    info!(sensor_id = sensor.id, kind = %sensor.r#type, total, "import finished");
    println!("Inserted {} records from {:?}", total, args.file);

    Ok(())
}
