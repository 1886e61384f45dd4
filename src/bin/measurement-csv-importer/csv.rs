use std::fs::File;

use air_quality::model::{NewMeasurement, ParameterKind};
use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, LocalResult, NaiveDateTime, Utc};
use chrono_tz::Tz;
use csv::{Reader, StringRecord};

const MEASURED_AT_INDEX: usize = 0;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug)]
pub struct CsvMeasurementIter {
    reader: Reader<File>,
    value_index: usize,
    sensor_id: i64,
    timezone: Tz,
}

impl CsvMeasurementIter {
    pub fn new(file: File, sensor_id: i64, kind: ParameterKind, timezone: Tz) -> Result<Self> {
        let mut reader = Reader::from_reader(file);
        let headers = reader.headers().context("failed to read CSV header")?;
        let value_index = detect_value_column(headers, kind)?;

        Ok(Self {
            reader,
            value_index,
            sensor_id,
            timezone,
        })
    }
}

impl Iterator for CsvMeasurementIter {
    type Item = Result<NewMeasurement>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.reader.records().next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };

        let record = (|| -> Result<NewMeasurement> {
            let measured_at = parse_timestamp(&row[MEASURED_AT_INDEX], self.timezone)?;

            let raw = row
                .get(self.value_index)
                .with_context(|| format!("missing value column {}", self.value_index))?;
            let value = raw
                .parse()
                .with_context(|| format!("failed to parse value: {raw}"))?;

            Ok(NewMeasurement {
                sensor_id: self.sensor_id,
                value,
                measured_at,
            })
        })();

        Some(record)
    }
}

/// Finds the column holding readings of `kind`.
///
/// Files with a single data column are taken as is; wider exports, such as
/// those of multi-parameter meters, are matched by whole words of the header
/// name, so a `Co2(ppm)` column is never taken for particulate matter.
fn detect_value_column(headers: &StringRecord, kind: ParameterKind) -> Result<usize> {
    if headers.len() == 2 {
        return Ok(1);
    }

    let found = headers.iter().enumerate().skip(1).find(|(_, h)| {
        h.to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| names_kind(word, kind))
    });

    match found {
        Some((index, _)) => Ok(index),
        None => bail!("no {kind} column in CSV header: {headers:?}"),
    }
}

fn names_kind(word: &str, kind: ParameterKind) -> bool {
    match kind {
        ParameterKind::Temperature => word == "temperature" || word == "temp",
        ParameterKind::Humidity => word == "humidity" || word == "rh",
        ParameterKind::Co2 => word == "co2",
        ParameterKind::Dust => match word.strip_prefix("pm") {
            Some(size) => size.is_empty() || size.starts_with(|c: char| c.is_ascii_digit()),
            None => word == "dust",
        },
    }
}

fn parse_timestamp(s: &str, timezone: Tz) -> Result<DateTime<Utc>> {
    let naive = TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .with_context(|| format!("failed to parse timestamp: {s}"))?;

    let local = match naive.and_local_timezone(timezone) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => bail!("invalid timestamp: {s}"),
    };

    Ok(local.with_timezone(&Utc))
}
