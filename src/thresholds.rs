//! Threshold bands and parameter classification.
//!
//! Bands come in two shapes. Range bands bound a parameter from both sides
//! (temperature, humidity), ceiling bands only from above (CO2, dust). The
//! shape is picked by the configuration, so a thresholds file written as
//!
//! ```json
//! {
//!   "temperature": { "min": 18.0, "optimal_min": 20.0, "optimal_max": 24.0, "max": 26.0 },
//!   "co2": { "optimal": 800.0, "acceptable": 1000.0, "max": 1400.0 }
//! }
//! ```
//!
//! classifies temperature five ways and CO2 four ways. A kind without a band
//! classifies as [`ParameterStatus::Unknown`].

use std::{fs, path::Path};

use anyhow::{Context as _, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    model::{ParameterKind, ParameterStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBand {
    pub min: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub max: f64,
}

impl RangeBand {
    pub fn classify(&self, value: f64) -> ParameterStatus {
        if value < self.min {
            ParameterStatus::CriticalLow
        } else if value < self.optimal_min {
            ParameterStatus::Low
        } else if value <= self.optimal_max {
            ParameterStatus::Optimal
        } else if value <= self.max {
            ParameterStatus::High
        } else {
            ParameterStatus::CriticalHigh
        }
    }

    fn bounds(&self) -> [f64; 4] {
        [self.min, self.optimal_min, self.optimal_max, self.max]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CeilingBand {
    pub optimal: f64,
    pub acceptable: f64,
    pub max: f64,
}

impl CeilingBand {
    pub fn classify(&self, value: f64) -> ParameterStatus {
        if value <= self.optimal {
            ParameterStatus::Optimal
        } else if value <= self.acceptable {
            ParameterStatus::Acceptable
        } else if value <= self.max {
            ParameterStatus::High
        } else {
            ParameterStatus::Critical
        }
    }

    fn bounds(&self) -> [f64; 3] {
        [self.optimal, self.acceptable, self.max]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Band {
    Range(RangeBand),
    Ceiling(CeilingBand),
}

impl Band {
    pub fn classify(&self, value: f64) -> ParameterStatus {
        match self {
            Band::Range(band) => band.classify(value),
            Band::Ceiling(band) => band.classify(value),
        }
    }

    fn is_ordered(&self) -> bool {
        fn non_decreasing(bounds: &[f64]) -> bool {
            bounds.iter().all(|b| b.is_finite()) && bounds.windows(2).all(|w| w[0] <= w[1])
        }

        match self {
            Band::Range(band) => non_decreasing(&band.bounds()),
            Band::Ceiling(band) => non_decreasing(&band.bounds()),
        }
    }
}

/// Immutable threshold configuration handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds {
    bands: IndexMap<ParameterKind, Band>,
}

impl Default for Thresholds {
    /// Indoor air standards of the Republic of Belarus.
    fn default() -> Self {
        let bands = IndexMap::from([
            (
                ParameterKind::Temperature,
                Band::Range(RangeBand {
                    min: 18.0,
                    optimal_min: 20.0,
                    optimal_max: 24.0,
                    max: 26.0,
                }),
            ),
            (
                ParameterKind::Humidity,
                Band::Range(RangeBand {
                    min: 30.0,
                    optimal_min: 40.0,
                    optimal_max: 60.0,
                    max: 65.0,
                }),
            ),
            (
                ParameterKind::Co2,
                Band::Ceiling(CeilingBand {
                    optimal: 800.0,
                    acceptable: 1000.0,
                    max: 1400.0,
                }),
            ),
            (
                ParameterKind::Dust,
                Band::Ceiling(CeilingBand {
                    optimal: 0.05,
                    acceptable: 0.15,
                    max: 0.25,
                }),
            ),
        ]);

        Self { bands }
    }
}

impl Thresholds {
    pub fn new(bands: IndexMap<ParameterKind, Band>) -> Result<Self, Error> {
        for (kind, band) in &bands {
            if !band.is_ordered() {
                return Err(Error::InvalidThresholds {
                    kind: kind.to_string(),
                    reason: "bounds must be finite and non-decreasing".to_string(),
                });
            }
        }

        Ok(Self { bands })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let bands: IndexMap<ParameterKind, Band> =
            serde_json::from_str(json).context("failed to parse thresholds JSON")?;

        Ok(Self::new(bands)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read thresholds file: {}", path.display()))?;

        Self::from_json(&json)
            .with_context(|| format!("failed to load thresholds from {}", path.display()))
    }

    pub fn band(&self, kind: ParameterKind) -> Option<&Band> {
        self.bands.get(&kind)
    }

    pub fn classify(&self, kind: ParameterKind, value: f64) -> ParameterStatus {
        match self.bands.get(&kind) {
            Some(band) => band.classify(value),
            None => ParameterStatus::Unknown,
        }
    }

    /// Classifies a reading whose kind is only known by name.
    pub fn classify_named(&self, kind: &str, value: f64) -> ParameterStatus {
        match kind.parse::<ParameterKind>() {
            Ok(kind) => self.classify(kind, value),
            Err(_) => ParameterStatus::Unknown,
        }
    }
}
