//! Snapshot module - Validated skin metric data

mod builder;
mod model;

pub use model::{
    HeatCell, Metric, MetricSnapshot, MetricValues, SeriesKey, SnapshotError, TimeSeries,
};
