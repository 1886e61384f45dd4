use std::fmt;

use serde::Serialize;

/// Qualitative classification of a reading against its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStatus {
    Optimal,
    Acceptable,
    Low,
    High,
    CriticalLow,
    CriticalHigh,
    Critical,
    NoData,
    Unknown,
}

impl ParameterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterStatus::Optimal => "optimal",
            ParameterStatus::Acceptable => "acceptable",
            ParameterStatus::Low => "low",
            ParameterStatus::High => "high",
            ParameterStatus::CriticalLow => "critical_low",
            ParameterStatus::CriticalHigh => "critical_high",
            ParameterStatus::Critical => "critical",
            ParameterStatus::NoData => "no_data",
            ParameterStatus::Unknown => "unknown",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ParameterStatus::Optimal => "Optimal level",
            ParameterStatus::Acceptable => "Acceptable level",
            ParameterStatus::Low => "Below optimal level",
            ParameterStatus::High => "Above optimal level",
            ParameterStatus::CriticalLow => "Critically low level",
            ParameterStatus::CriticalHigh => "Critically high level",
            ParameterStatus::Critical => "Critical level",
            ParameterStatus::NoData => "No data",
            ParameterStatus::Unknown => "Unknown parameter",
        }
    }

    /// Severity used to pick the overall room status. Higher is worse.
    pub fn priority(&self) -> u8 {
        match self {
            ParameterStatus::Optimal => 0,
            ParameterStatus::Acceptable => 1,
            ParameterStatus::Low | ParameterStatus::High => 2,
            ParameterStatus::CriticalLow
            | ParameterStatus::CriticalHigh
            | ParameterStatus::Critical => 3,
            ParameterStatus::NoData | ParameterStatus::Unknown => 0,
        }
    }

    pub fn is_low(&self) -> bool {
        matches!(self, ParameterStatus::Low | ParameterStatus::CriticalLow)
    }

    pub fn is_high(&self) -> bool {
        matches!(
            self,
            ParameterStatus::High | ParameterStatus::CriticalHigh | ParameterStatus::Critical
        )
    }

    /// Whether the status is good enough not to be reported as an issue.
    pub fn is_satisfactory(&self) -> bool {
        matches!(self, ParameterStatus::Optimal | ParameterStatus::Acceptable)
    }
}

impl fmt::Display for ParameterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
