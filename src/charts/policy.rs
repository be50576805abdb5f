//! Chart Policy Module
//! Static lookup table from chart name to encoding, axis bounds and field mapping,
//! plus extraction of a drawable figure from a snapshot.

use crate::charts::ChartError;
use crate::snapshot::{HeatCell, Metric, MetricSnapshot, SeriesKey, SnapshotError};
use std::fmt;
use std::str::FromStr;

/// Logical chart names. The discriminant indexes `CHART_POLICIES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartName {
    Score = 0,
    MoistureOil = 1,
    Radar = 2,
    Trend = 3,
    Heatmap = 4,
    Comparison = 5,
}

impl ChartName {
    pub const ALL: [ChartName; 6] = [
        ChartName::Score,
        ChartName::MoistureOil,
        ChartName::Radar,
        ChartName::Trend,
        ChartName::Heatmap,
        ChartName::Comparison,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartName::Score => "score",
            ChartName::MoistureOil => "moistureOil",
            ChartName::Radar => "radar",
            ChartName::Trend => "trend",
            ChartName::Heatmap => "heatmap",
            ChartName::Comparison => "comparison",
        }
    }

    pub fn policy(self) -> &'static ChartPolicy {
        &CHART_POLICIES[self as usize]
    }
}

impl fmt::Display for ChartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartName {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ChartError::UnknownChart(s.to_string()))
    }
}

/// Visual encoding of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Line,
    GroupedBar,
    Radar,
    Heatmap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

pub const PERCENT_AXIS: AxisBounds = AxisBounds {
    min: 0.0,
    max: 100.0,
};

/// Which part of the snapshot feeds a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldMapping {
    /// Categories are the history dates, one dataset per series.
    History(&'static [SeriesKey]),
    /// Categories are the five metrics, one dataset with the current values.
    CurrentMetrics,
    /// Categories are the five metrics, current and previous datasets.
    CurrentVsPrevious,
    /// Free (x, y, value) cells.
    HeatCells,
}

#[derive(Debug)]
pub struct ChartPolicy {
    pub name: ChartName,
    pub title: &'static str,
    pub encoding: Encoding,
    /// `None` means derive the value range from the data.
    pub bounds: Option<AxisBounds>,
    pub fields: FieldMapping,
}

pub type Rgb = (u8, u8, u8);

pub const TEAL: Rgb = (75, 192, 192);
pub const BLUE: Rgb = (54, 162, 235);
pub const PINK: Rgb = (255, 99, 132);

pub static CHART_POLICIES: [ChartPolicy; 6] = [
    ChartPolicy {
        name: ChartName::Score,
        title: "Skin Score",
        encoding: Encoding::Line,
        bounds: Some(PERCENT_AXIS),
        fields: FieldMapping::History(&[SeriesKey::Score]),
    },
    ChartPolicy {
        name: ChartName::MoistureOil,
        title: "Moisture vs Oil",
        encoding: Encoding::GroupedBar,
        bounds: Some(PERCENT_AXIS),
        fields: FieldMapping::History(&[SeriesKey::Moisture, SeriesKey::Oil]),
    },
    ChartPolicy {
        name: ChartName::Radar,
        title: "Current State",
        encoding: Encoding::Radar,
        bounds: Some(PERCENT_AXIS),
        fields: FieldMapping::CurrentMetrics,
    },
    ChartPolicy {
        name: ChartName::Trend,
        title: "Trends",
        encoding: Encoding::Line,
        bounds: Some(PERCENT_AXIS),
        fields: FieldMapping::History(&[
            SeriesKey::Moisture,
            SeriesKey::Oil,
            SeriesKey::Sensitivity,
        ]),
    },
    ChartPolicy {
        name: ChartName::Heatmap,
        title: "Heatmap",
        encoding: Encoding::Heatmap,
        bounds: None,
        fields: FieldMapping::HeatCells,
    },
    ChartPolicy {
        name: ChartName::Comparison,
        title: "Current vs Previous",
        encoding: Encoding::GroupedBar,
        bounds: Some(PERCENT_AXIS),
        fields: FieldMapping::CurrentVsPrevious,
    },
];

fn series_color(key: SeriesKey) -> Rgb {
    match key {
        SeriesKey::Score | SeriesKey::Sensitivity => TEAL,
        SeriesKey::Moisture => BLUE,
        SeriesKey::Oil => PINK,
    }
}

/// One dataset inside a figure. `None` marks a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSeries {
    pub label: String,
    pub color: Rgb,
    pub values: Vec<Option<f64>>,
}

/// Everything a drawing backend needs to paint one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFigure {
    pub name: ChartName,
    pub title: &'static str,
    pub encoding: Encoding,
    pub bounds: AxisBounds,
    pub categories: Vec<String>,
    pub series: Vec<FigureSeries>,
    pub cells: Vec<HeatCell>,
}

impl ChartFigure {
    /// Build the figure for `name` from an already validated snapshot.
    pub fn extract(name: ChartName, snapshot: &MetricSnapshot) -> Result<Self, SnapshotError> {
        let policy = name.policy();
        let mut figure = ChartFigure {
            name,
            title: policy.title,
            encoding: policy.encoding,
            bounds: policy.bounds.unwrap_or(PERCENT_AXIS),
            categories: Vec::new(),
            series: Vec::new(),
            cells: Vec::new(),
        };

        match policy.fields {
            FieldMapping::History(keys) => {
                for &key in keys {
                    let (dates, values) = snapshot.series(key)?;
                    if figure.categories.is_empty() {
                        figure.categories = dates.to_vec();
                    }
                    figure.series.push(FigureSeries {
                        label: key.label().to_string(),
                        color: series_color(key),
                        values: values.iter().copied().map(Some).collect(),
                    });
                }
            }
            FieldMapping::CurrentMetrics => {
                let current = snapshot
                    .current
                    .as_ref()
                    .ok_or(SnapshotError::MissingSeries("current"))?;
                figure.categories = metric_labels();
                figure.series.push(FigureSeries {
                    label: "Current".to_string(),
                    color: BLUE,
                    values: current.axis_values(),
                });
            }
            FieldMapping::CurrentVsPrevious => {
                let current = snapshot
                    .current
                    .as_ref()
                    .ok_or(SnapshotError::MissingSeries("current"))?;
                let previous = snapshot
                    .previous
                    .as_ref()
                    .ok_or(SnapshotError::MissingSeries("previous"))?;
                figure.categories = metric_labels();
                figure.series.push(FigureSeries {
                    label: "Current".to_string(),
                    color: BLUE,
                    values: current.axis_values(),
                });
                figure.series.push(FigureSeries {
                    label: "Previous".to_string(),
                    color: PINK,
                    values: previous.axis_values(),
                });
            }
            FieldMapping::HeatCells => {
                if snapshot.heatmap.is_empty() {
                    return Err(SnapshotError::MissingSeries("heatmap"));
                }
                figure.cells = snapshot.heatmap.clone();
                figure.bounds = value_range(&figure.cells);
            }
        }

        Ok(figure)
    }
}

fn metric_labels() -> Vec<String> {
    Metric::ALL.iter().map(|m| m.label().to_string()).collect()
}

fn value_range(cells: &[HeatCell]) -> AxisBounds {
    let (min, max) = cells
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.value), hi.max(c.value))
        });
    if min < max {
        AxisBounds { min, max }
    } else {
        AxisBounds {
            min: min - 1.0,
            max: max + 1.0,
        }
    }
}

impl MetricSnapshot {
    /// Chart names this snapshot has enough data for, in table order.
    pub fn available_charts(&self) -> Vec<ChartName> {
        if self.validate().is_err() {
            return Vec::new();
        }
        ChartName::ALL
            .into_iter()
            .filter(|&name| ChartFigure::extract(name, self).is_ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{MetricValues, TimeSeries};

    #[test]
    fn table_is_indexed_by_name() {
        for name in ChartName::ALL {
            assert_eq!(name.policy().name, name);
        }
    }

    #[test]
    fn names_round_trip_through_strings() {
        assert_eq!("moistureOil".parse::<ChartName>(), Ok(ChartName::MoistureOil));
        assert_eq!(ChartName::Comparison.to_string(), "comparison");
        assert_eq!(
            "pie".parse::<ChartName>(),
            Err(ChartError::UnknownChart("pie".to_string()))
        );
    }

    #[test]
    fn score_chart_is_a_percent_line() {
        let snapshot =
            MetricSnapshot::with_scores(vec!["d1".into(), "d2".into()], vec![70.0, 82.0]);
        let figure = ChartFigure::extract(ChartName::Score, &snapshot).unwrap();

        assert_eq!(figure.encoding, Encoding::Line);
        assert_eq!(figure.bounds, AxisBounds { min: 0.0, max: 100.0 });
        assert_eq!(figure.categories, vec!["d1", "d2"]);
        assert_eq!(figure.series.len(), 1);
        assert_eq!(figure.series[0].values, vec![Some(70.0), Some(82.0)]);
    }

    #[test]
    fn comparison_needs_previous_values() {
        let snapshot = MetricSnapshot {
            current: Some(MetricValues::default()),
            ..Default::default()
        };
        assert_eq!(
            ChartFigure::extract(ChartName::Comparison, &snapshot).unwrap_err(),
            SnapshotError::MissingSeries("previous")
        );
        assert!(ChartFigure::extract(ChartName::Radar, &snapshot).is_ok());
    }

    #[test]
    fn radar_has_five_fixed_axes() {
        let snapshot = MetricSnapshot {
            current: Some(MetricValues {
                moisture: 45.0,
                oil: 30.0,
                sensitivity: 12.0,
                elasticity: Some(60.0),
                brightness: Some(70.0),
            }),
            ..Default::default()
        };
        let figure = ChartFigure::extract(ChartName::Radar, &snapshot).unwrap();
        assert_eq!(figure.categories.len(), 5);
        assert_eq!(figure.categories[3], "Elasticity");
        assert_eq!(figure.series[0].values[4], Some(70.0));
    }

    #[test]
    fn heatmap_bounds_follow_the_data() {
        let snapshot = MetricSnapshot {
            heatmap: vec![
                HeatCell { x: 0.0, y: 0.0, value: 10.0 },
                HeatCell { x: 1.0, y: 0.0, value: 35.0 },
            ],
            ..Default::default()
        };
        let figure = ChartFigure::extract(ChartName::Heatmap, &snapshot).unwrap();
        assert_eq!(figure.bounds, AxisBounds { min: 10.0, max: 35.0 });
    }

    #[test]
    fn available_charts_reflect_present_data() {
        let snapshot = MetricSnapshot {
            current: Some(MetricValues::default()),
            history: Some(TimeSeries {
                dates: vec!["d1".into()],
                scores: vec![50.0],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            snapshot.available_charts(),
            vec![ChartName::Score, ChartName::Radar]
        );
    }
}
