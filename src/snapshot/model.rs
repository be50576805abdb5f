//! Metric Snapshot Model
//! Strongly typed skin measurements with an explicit validation step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("series `{series}` has {actual} values but there are {expected} dates")]
    MisalignedSeries {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("snapshot has no `{0}` data")]
    MissingSeries(&'static str),
    #[error("`{0}` is not a finite number")]
    NonFinite(&'static str),
}

/// The five fixed measurement axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Moisture,
    Oil,
    Sensitivity,
    Elasticity,
    Brightness,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Moisture,
        Metric::Oil,
        Metric::Sensitivity,
        Metric::Elasticity,
        Metric::Brightness,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Moisture => "Moisture",
            Metric::Oil => "Oil",
            Metric::Sensitivity => "Sensitivity",
            Metric::Elasticity => "Elasticity",
            Metric::Brightness => "Brightness",
        }
    }
}

/// Historical series that can accompany a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    Score,
    Moisture,
    Oil,
    Sensitivity,
}

impl SeriesKey {
    pub fn name(self) -> &'static str {
        match self {
            SeriesKey::Score => "scores",
            SeriesKey::Moisture => "moisture",
            SeriesKey::Oil => "oil",
            SeriesKey::Sensitivity => "sensitivity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeriesKey::Score => "Skin score",
            SeriesKey::Moisture => "Moisture",
            SeriesKey::Oil => "Oil",
            SeriesKey::Sensitivity => "Sensitivity",
        }
    }
}

/// Current values on the five axes. The backend only reports the first three,
/// so elasticity and brightness are optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricValues {
    pub moisture: f64,
    pub oil: f64,
    pub sensitivity: f64,
    #[serde(default)]
    pub elasticity: Option<f64>,
    #[serde(default)]
    pub brightness: Option<f64>,
}

impl MetricValues {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Moisture => Some(self.moisture),
            Metric::Oil => Some(self.oil),
            Metric::Sensitivity => Some(self.sensitivity),
            Metric::Elasticity => self.elasticity,
            Metric::Brightness => self.brightness,
        }
    }

    /// Values in `Metric::ALL` order; absent axes are `None`.
    pub fn axis_values(&self) -> Vec<Option<f64>> {
        Metric::ALL.iter().map(|&m| self.get(m)).collect()
    }

    fn check_finite(&self, field: &'static str) -> Result<(), SnapshotError> {
        if self.axis_values().into_iter().flatten().all(f64::is_finite) {
            Ok(())
        } else {
            Err(SnapshotError::NonFinite(field))
        }
    }
}

/// Date-aligned historical values. Series left empty are treated as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub dates: Vec<String>,
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub moisture: Vec<f64>,
    #[serde(default)]
    pub oil: Vec<f64>,
    #[serde(default)]
    pub sensitivity: Vec<f64>,
}

impl TimeSeries {
    pub fn get(&self, key: SeriesKey) -> &[f64] {
        match key {
            SeriesKey::Score => &self.scores,
            SeriesKey::Moisture => &self.moisture,
            SeriesKey::Oil => &self.oil,
            SeriesKey::Sensitivity => &self.sensitivity,
        }
    }

    pub fn has(&self, key: SeriesKey) -> bool {
        !self.get(key).is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let expected = self.dates.len();
        for key in [
            SeriesKey::Score,
            SeriesKey::Moisture,
            SeriesKey::Oil,
            SeriesKey::Sensitivity,
        ] {
            let values = self.get(key);
            if values.is_empty() {
                continue;
            }
            if values.len() != expected {
                return Err(SnapshotError::MisalignedSeries {
                    series: key.name(),
                    expected,
                    actual: values.len(),
                });
            }
            if !values.iter().all(|v| v.is_finite()) {
                return Err(SnapshotError::NonFinite(key.name()));
            }
        }
        Ok(())
    }
}

/// One heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// A point-in-time set of measurements plus optional history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSnapshot {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub current: Option<MetricValues>,
    #[serde(default)]
    pub previous: Option<MetricValues>,
    #[serde(default)]
    pub history: Option<TimeSeries>,
    #[serde(default)]
    pub heatmap: Vec<HeatCell>,
}

impl MetricSnapshot {
    /// Shorthand for a snapshot that only carries a score history.
    pub fn with_scores(dates: Vec<String>, scores: Vec<f64>) -> Self {
        Self {
            history: Some(TimeSeries {
                dates,
                scores,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Check alignment and finiteness of everything the snapshot carries.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if let Some(score) = self.score {
            if !score.is_finite() {
                return Err(SnapshotError::NonFinite("score"));
            }
        }
        if let Some(current) = &self.current {
            current.check_finite("current")?;
        }
        if let Some(previous) = &self.previous {
            previous.check_finite("previous")?;
        }
        if let Some(history) = &self.history {
            history.validate()?;
        }
        let cells_finite = self
            .heatmap
            .iter()
            .all(|c| c.x.is_finite() && c.y.is_finite() && c.value.is_finite());
        if !cells_finite {
            return Err(SnapshotError::NonFinite("heatmap"));
        }
        Ok(())
    }

    /// Borrow the history, or fail naming the series that was needed.
    pub fn series(&self, key: SeriesKey) -> Result<(&[String], &[f64]), SnapshotError> {
        let history = self
            .history
            .as_ref()
            .ok_or(SnapshotError::MissingSeries("dates"))?;
        if history.is_empty() {
            return Err(SnapshotError::MissingSeries("dates"));
        }
        if !history.has(key) {
            return Err(SnapshotError::MissingSeries(key.name()));
        }
        Ok((&history.dates, history.get(key)))
    }
}
