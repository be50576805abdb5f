//! Snapshot Builder
//! Assembles chartable snapshots from backend analysis results and history.

use super::model::{HeatCell, Metric, MetricSnapshot, MetricValues, TimeSeries};
use crate::api::{AnalysisResult, HistoryRecord};

impl From<&AnalysisResult> for MetricValues {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            moisture: result.moisture,
            oil: result.oil,
            sensitivity: result.sensitivity,
            elasticity: result.elasticity,
            brightness: result.brightness,
        }
    }
}

impl From<&HistoryRecord> for MetricValues {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            moisture: record.moisture,
            oil: record.oil,
            sensitivity: record.sensitivity,
            elasticity: None,
            brightness: None,
        }
    }
}

impl MetricSnapshot {
    /// Snapshot of a single analysis, without history.
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        Self {
            score: Some(result.score),
            current: Some(MetricValues::from(result)),
            ..Default::default()
        }
    }

    /// Snapshot of the whole history in time order, whatever order `records` come in.
    /// The newest record is "current" and the one before it "previous".
    pub fn from_history(records: &[HistoryRecord]) -> Self {
        let records = HistoryRecord::chronological(records);
        if records.is_empty() {
            return Self::default();
        }

        let mut history = TimeSeries::default();
        let mut heatmap = Vec::with_capacity(records.len() * 3);

        for (i, record) in records.iter().enumerate() {
            history.dates.push(record.date_label());
            history.scores.push(record.score);
            history.moisture.push(record.moisture);
            history.oil.push(record.oil);
            history.sensitivity.push(record.sensitivity);

            let values = MetricValues::from(*record);
            for (row, metric) in Metric::ALL.iter().enumerate() {
                if let Some(value) = values.get(*metric) {
                    heatmap.push(HeatCell {
                        x: i as f64,
                        y: row as f64,
                        value,
                    });
                }
            }
        }

        let last = records.len() - 1;
        Self {
            score: Some(records[last].score),
            current: Some(MetricValues::from(records[last])),
            previous: last
                .checked_sub(1)
                .map(|idx| MetricValues::from(records[idx])),
            history: Some(history),
            heatmap,
        }
    }
}
