use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Error;

#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub id: i64,

    pub sensor_id: i64,

    pub value: f64,

    pub measured_at: DateTime<Utc>,
}

/// A measurement that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewMeasurement {
    pub sensor_id: i64,

    pub value: f64,

    pub measured_at: DateTime<Utc>,
}

/// Rejects readings no sensor can produce before they reach storage.
pub fn validate_measurement_value(value: f64) -> Result<(), Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidMeasurement(value));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_and_positive_values() {
        assert!(validate_measurement_value(0.0).is_ok());
        assert!(validate_measurement_value(1400.5).is_ok());
    }

    #[test]
    fn rejects_negative_and_non_finite_values() {
        assert!(matches!(
            validate_measurement_value(-0.1),
            Err(Error::InvalidMeasurement(_))
        ));
        assert!(validate_measurement_value(f64::NAN).is_err());
        assert!(validate_measurement_value(f64::INFINITY).is_err());
    }
}
