use thiserror::Error;

/// Domain errors raised by the library.
///
/// Functions return `anyhow::Result`; callers that need to distinguish these
/// cases use `err.downcast_ref::<Error>()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("room not found: {0}")]
    RoomNotFound(i64),

    #[error("sensor not found: {0}")]
    SensorNotFound(i64),

    #[error("equipment not found: {0}")]
    EquipmentNotFound(i64),

    #[error("invalid {kind}: {value}")]
    InvalidValue { kind: &'static str, value: String },

    #[error("measurement value must be a non-negative number, got {0}")]
    InvalidMeasurement(f64),

    #[error("invalid thresholds for {kind}: {reason}")]
    InvalidThresholds { kind: String, reason: String },
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, value: &str) -> Self {
        Error::InvalidValue {
            kind,
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::RoomNotFound(_) | Error::SensorNotFound(_) | Error::EquipmentNotFound(_)
        )
    }
}
