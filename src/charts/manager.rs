//! Chart Lifecycle Manager
//! Owns the live chart handles of one container and guarantees a single
//! instance per chart name across render / update / dispose.

use crate::charts::{ChartFigure, ChartName, ContainerId, SurfaceHost, SurfaceId};
use crate::snapshot::{MetricSnapshot, SnapshotError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("container `{0}` not found")]
    ContainerNotFound(ContainerId),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
    #[error("nothing rendered yet; call render before update")]
    NotRendered,
    #[error("failed to draw `{chart}`: {reason}")]
    Draw { chart: ChartName, reason: String },
    #[error("unknown chart name `{0}`")]
    UnknownChart(String),
}

/// A rendered chart bound to one drawing surface.
#[derive(Debug)]
pub struct ChartHandle {
    surface: SurfaceId,
    figure: ChartFigure,
}

impl ChartHandle {
    pub fn name(&self) -> ChartName {
        self.figure.name
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn figure(&self) -> &ChartFigure {
        &self.figure
    }
}

/// Renders snapshots as a named set of charts inside one container.
pub struct ChartLifecycleManager<H: SurfaceHost> {
    host: H,
    container: Option<ContainerId>,
    chart_names: Vec<ChartName>,
    handles: Vec<ChartHandle>,
}

impl<H: SurfaceHost> ChartLifecycleManager<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            container: None,
            chart_names: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Read access to the host, e.g. for presenting surfaces.
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn container(&self) -> Option<&ContainerId> {
        self.container.as_ref()
    }

    pub fn chart_names(&self) -> &[ChartName] {
        &self.chart_names
    }

    pub fn handles(&self) -> &[ChartHandle] {
        &self.handles
    }

    /// Render `names` from `snapshot` into `container`, replacing any live charts.
    /// Nothing is created unless every requested chart can be built.
    pub fn render(
        &mut self,
        container: ContainerId,
        snapshot: &MetricSnapshot,
        names: &[ChartName],
    ) -> Result<&[ChartHandle], ChartError> {
        if !self.host.has_container(&container) {
            return Err(ChartError::ContainerNotFound(container));
        }

        let mut unique: Vec<ChartName> = Vec::with_capacity(names.len());
        for &name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        let figures = Self::build_figures(snapshot, &unique)?;

        self.destroy_all();
        let handles = match self.create_all(&container, figures) {
            Ok(handles) => handles,
            Err(e) => {
                self.container = None;
                self.chart_names.clear();
                return Err(e);
            }
        };

        info!(
            container = %container,
            charts = handles.len(),
            "rendered chart set"
        );
        self.container = Some(container);
        self.chart_names = unique;
        self.handles = handles;
        Ok(&self.handles)
    }

    /// Re-render the current chart set from a new snapshot.
    /// All old handles are destroyed before any new one is created.
    pub fn update(&mut self, snapshot: &MetricSnapshot) -> Result<&[ChartHandle], ChartError> {
        let container = self.container.clone().ok_or(ChartError::NotRendered)?;
        if !self.host.has_container(&container) {
            return Err(ChartError::ContainerNotFound(container));
        }
        let figures = Self::build_figures(snapshot, &self.chart_names)?;

        self.destroy_all();
        match self.create_all(&container, figures) {
            Ok(handles) => {
                debug!(container = %container, charts = handles.len(), "updated chart set");
                self.handles = handles;
                Ok(&self.handles)
            }
            Err(e) => {
                // The old charts are gone; drop the binding so callers re-render.
                self.container = None;
                self.chart_names.clear();
                Err(e)
            }
        }
    }

    /// Destroy every live chart and release the container. Safe to repeat.
    pub fn dispose(&mut self) {
        if self.container.is_none() && self.handles.is_empty() {
            return;
        }
        self.destroy_all();
        if let Some(container) = self.container.take() {
            info!(container = %container, "disposed chart set");
        }
        self.chart_names.clear();
    }

    fn build_figures(
        snapshot: &MetricSnapshot,
        names: &[ChartName],
    ) -> Result<Vec<ChartFigure>, ChartError> {
        snapshot.validate()?;
        names
            .iter()
            .map(|&name| ChartFigure::extract(name, snapshot).map_err(ChartError::from))
            .collect()
    }

    fn destroy_all(&mut self) {
        for handle in self.handles.drain(..) {
            match self.host.destroy_surface(handle.surface) {
                Ok(()) => debug!(chart = %handle.name(), surface = %handle.surface, "destroyed chart"),
                Err(e) => warn!(chart = %handle.name(), "{}", e),
            }
        }
    }

    /// Create one surface per figure; on failure roll back what this call created.
    fn create_all(
        &mut self,
        container: &ContainerId,
        figures: Vec<ChartFigure>,
    ) -> Result<Vec<ChartHandle>, ChartError> {
        let mut created: Vec<ChartHandle> = Vec::with_capacity(figures.len());

        for figure in figures {
            let result = self
                .host
                .append_surface(container, figure.name)
                .and_then(|surface| match self.host.draw(surface, &figure) {
                    Ok(()) => Ok(surface),
                    Err(e) => {
                        if let Err(d) = self.host.destroy_surface(surface) {
                            warn!("{}", d);
                        }
                        Err(e)
                    }
                });

            match result {
                Ok(surface) => {
                    debug!(chart = %figure.name, surface = %surface, "created chart");
                    created.push(ChartHandle { surface, figure });
                }
                Err(e) => {
                    for handle in created.drain(..) {
                        if let Err(d) = self.host.destroy_surface(handle.surface) {
                            warn!("{}", d);
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(created)
    }
}

impl<H: SurfaceHost> Drop for ChartLifecycleManager<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::testing::{Event, RecordingHost};
    use crate::charts::Encoding;
    use crate::snapshot::{MetricValues, TimeSeries};
    use std::rc::Rc;

    fn dates(n: usize) -> Vec<String> {
        (1..=n).map(|d| format!("d{}", d)).collect()
    }

    fn full_snapshot(n: usize) -> MetricSnapshot {
        let ramp = |base: f64| (0..n).map(|i| base + i as f64).collect::<Vec<_>>();
        MetricSnapshot {
            score: Some(80.0),
            current: Some(MetricValues {
                moisture: 45.0,
                oil: 30.0,
                sensitivity: 12.0,
                elasticity: Some(60.0),
                brightness: Some(70.0),
            }),
            previous: Some(MetricValues {
                moisture: 40.0,
                oil: 35.0,
                sensitivity: 15.0,
                elasticity: Some(58.0),
                brightness: Some(65.0),
            }),
            history: Some(TimeSeries {
                dates: dates(n),
                scores: ramp(70.0),
                moisture: ramp(40.0),
                oil: ramp(30.0),
                sensitivity: ramp(10.0),
            }),
            heatmap: Vec::new(),
        }
    }

    const THREE: [ChartName; 3] = [ChartName::Score, ChartName::Radar, ChartName::Trend];

    #[test]
    fn render_creates_one_handle_and_surface_per_name() {
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        let handles = manager
            .render("main".into(), &full_snapshot(4), &THREE)
            .unwrap();

        assert_eq!(handles.len(), 3);
        let names: Vec<_> = handles.iter().map(|h| h.name()).collect();
        assert_eq!(names, THREE.to_vec());
        assert_eq!(manager.host().surfaces_in("main"), 3);
    }

    #[test]
    fn duplicate_names_collapse() {
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        manager
            .render(
                "main".into(),
                &full_snapshot(2),
                &[ChartName::Score, ChartName::Score],
            )
            .unwrap();
        assert_eq!(manager.handles().len(), 1);
        assert_eq!(manager.host().surfaces_in("main"), 1);
    }

    #[test]
    fn missing_container_is_reported() {
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        let err = manager
            .render("side".into(), &full_snapshot(2), &THREE)
            .unwrap_err();
        assert_eq!(err, ChartError::ContainerNotFound("side".into()));
        assert!(manager.handles().is_empty());
    }

    #[test]
    fn repeated_updates_do_not_accumulate() {
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        manager
            .render("main".into(), &full_snapshot(3), &THREE)
            .unwrap();
        manager.update(&full_snapshot(4)).unwrap();
        manager.update(&full_snapshot(5)).unwrap();

        assert_eq!(manager.handles().len(), 3);
        assert_eq!(manager.host().surfaces_in("main"), 3);
        assert_eq!(manager.host().live.len(), 3);
    }

    #[test]
    fn misaligned_snapshot_creates_nothing() {
        let mut bad = full_snapshot(5);
        if let Some(history) = bad.history.as_mut() {
            history.moisture.pop();
        }

        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        let err = manager.render("main".into(), &bad, &THREE).unwrap_err();
        assert!(matches!(err, ChartError::InvalidSnapshot(_)));
        assert!(manager.handles().is_empty());
        assert_eq!(manager.host().surfaces_in("main"), 0);

        manager
            .render("main".into(), &full_snapshot(5), &THREE)
            .unwrap();
        let before: Vec<_> = manager.handles().iter().map(|h| h.surface()).collect();
        let err = manager.update(&bad).unwrap_err();
        assert_eq!(
            err,
            ChartError::InvalidSnapshot(SnapshotError::MisalignedSeries {
                series: "moisture",
                expected: 5,
                actual: 4,
            })
        );
        // previous charts stay live and untouched
        let after: Vec<_> = manager.handles().iter().map(|h| h.surface()).collect();
        assert_eq!(before, after);
        assert_eq!(manager.host().surfaces_in("main"), 3);
    }

    #[test]
    fn missing_series_for_requested_chart_is_invalid() {
        let snapshot = MetricSnapshot::with_scores(dates(2), vec![70.0, 82.0]);
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        let err = manager
            .render("main".into(), &snapshot, &[ChartName::Score, ChartName::Radar])
            .unwrap_err();
        assert_eq!(
            err,
            ChartError::InvalidSnapshot(SnapshotError::MissingSeries("current"))
        );
        assert_eq!(manager.host().surfaces_in("main"), 0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        manager.dispose();
        assert!(manager.handles().is_empty());

        manager
            .render("main".into(), &full_snapshot(2), &THREE)
            .unwrap();
        manager.dispose();
        assert!(manager.handles().is_empty());
        assert!(manager.container().is_none());
        manager.dispose();
        assert!(manager.handles().is_empty());
        assert_eq!(manager.host().surfaces_in("main"), 0);
    }

    #[test]
    fn score_example_yields_ordered_line() {
        let snapshot = MetricSnapshot::with_scores(dates(2), vec![70.0, 82.0]);
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        manager
            .render("main".into(), &snapshot, &[ChartName::Score])
            .unwrap();

        let handle = &manager.handles()[0];
        assert_eq!(handle.name(), ChartName::Score);
        assert_eq!(handle.figure().encoding, Encoding::Line);
        assert_eq!(handle.figure().bounds.min, 0.0);
        assert_eq!(handle.figure().bounds.max, 100.0);
        assert_eq!(handle.figure().series[0].values, vec![Some(70.0), Some(82.0)]);
    }

    #[test]
    fn update_destroys_everything_before_creating() {
        let host = RecordingHost::with_container("main");
        let events = Rc::clone(&host.events);
        let mut manager = ChartLifecycleManager::new(host);
        manager
            .render("main".into(), &full_snapshot(3), &THREE)
            .unwrap();
        events.borrow_mut().clear();

        manager.update(&full_snapshot(4)).unwrap();

        let log = events.borrow();
        let first_append = log
            .iter()
            .position(|e| matches!(e, Event::Append { .. }))
            .unwrap();
        assert!(log[..first_append]
            .iter()
            .all(|e| matches!(e, Event::Destroy(_))));
        assert_eq!(first_append, 3);
        assert!(matches!(log[first_append], Event::Append { live_before: 0, .. }));
        assert!(log[first_append..]
            .iter()
            .all(|e| !matches!(e, Event::Destroy(_))));
        assert_eq!(manager.handles().len(), 3);
    }

    #[test]
    fn disposal_failures_are_swallowed() {
        let mut host = RecordingHost::with_container("main");
        host.fail_destroy = true;
        let mut manager = ChartLifecycleManager::new(host);
        manager
            .render("main".into(), &full_snapshot(2), &THREE)
            .unwrap();

        manager.update(&full_snapshot(3)).unwrap();
        assert_eq!(manager.handles().len(), 3);
        manager.dispose();
        assert!(manager.handles().is_empty());
    }

    #[test]
    fn failed_draw_rolls_back_created_surfaces() {
        let mut host = RecordingHost::with_container("main");
        host.fail_draw = Some(ChartName::Trend);
        let mut manager = ChartLifecycleManager::new(host);

        let err = manager
            .render("main".into(), &full_snapshot(2), &THREE)
            .unwrap_err();
        assert!(matches!(err, ChartError::Draw { chart: ChartName::Trend, .. }));
        assert!(manager.handles().is_empty());
        assert!(manager.container().is_none());
        assert_eq!(manager.host().surfaces_in("main"), 0);
    }

    #[test]
    fn update_before_render_fails() {
        let mut manager = ChartLifecycleManager::new(RecordingHost::with_container("main"));
        assert_eq!(
            manager.update(&full_snapshot(2)).unwrap_err(),
            ChartError::NotRendered
        );
    }

    #[test]
    fn drop_releases_surfaces() {
        let host = RecordingHost::with_container("main");
        let events = Rc::clone(&host.events);
        {
            let mut manager = ChartLifecycleManager::new(host);
            manager
                .render("main".into(), &full_snapshot(2), &THREE)
                .unwrap();
        }
        let destroyed = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Destroy(_)))
            .count();
        assert_eq!(destroyed, 3);
    }
}
