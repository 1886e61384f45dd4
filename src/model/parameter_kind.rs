use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A measured air-quality parameter. Also the type of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Temperature,
    Humidity,
    Co2,
    Dust,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 4] = [
        ParameterKind::Temperature,
        ParameterKind::Humidity,
        ParameterKind::Co2,
        ParameterKind::Dust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Temperature => "temperature",
            ParameterKind::Humidity => "humidity",
            ParameterKind::Co2 => "co2",
            ParameterKind::Dust => "dust",
        }
    }

    /// Unit suffix appended directly to a formatted value.
    pub fn unit(&self) -> &'static str {
        match self {
            ParameterKind::Temperature => "°C",
            ParameterKind::Humidity => "%",
            ParameterKind::Co2 => " ppm",
            ParameterKind::Dust => " mg/m³",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ParameterKind::Temperature => 0,
            ParameterKind::Humidity => 1,
            ParameterKind::Co2 => 2,
            ParameterKind::Dust => 3,
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(ParameterKind::Temperature),
            "humidity" => Ok(ParameterKind::Humidity),
            "co2" => Ok(ParameterKind::Co2),
            "dust" => Ok(ParameterKind::Dust),
            _ => Err(Error::invalid("sensor type", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_canonical_name() {
        for kind in ParameterKind::ALL {
            assert_eq!(kind.as_str().parse::<ParameterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn rejects_unknown_sensor_type() {
        let err = "pressure".parse::<ParameterKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid sensor type: pressure");
    }

    #[test]
    fn index_follows_canonical_order() {
        for (i, kind) in ParameterKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
