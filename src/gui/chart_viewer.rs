//! Chart Viewer Widget
//! Presents the charts owned by the lifecycle manager as egui textures.
//! Supports responsive multi-column layout based on available width.

use crate::charts::{
    BitmapStage, ChartError, ChartLifecycleManager, ContainerId, SurfaceHost, SurfaceId,
};
use crate::snapshot::MetricSnapshot;
use egui::{Color32, ColorImage, RichText, TextureHandle, TextureOptions};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Container all dashboard charts are appended to.
pub const DASHBOARD: &str = "dashboard";

const CHART_SPACING: f32 = 15.0;

pub struct ChartViewer<H: SurfaceHost = BitmapStage> {
    manager: ChartLifecycleManager<H>,
    container: ContainerId,
    chart_size: (u32, u32),
    /// Uploaded textures keyed by surface, with the bitmap revision they show.
    textures: HashMap<SurfaceId, (u64, TextureHandle)>,
    pending: Option<MetricSnapshot>,
    last_error: Option<String>,
}

impl<H: SurfaceHost> ChartViewer<H> {
    /// Viewer over a host that already has a `DASHBOARD` container.
    pub fn with_host(host: H, chart_size: (u32, u32)) -> Self {
        Self {
            manager: ChartLifecycleManager::new(host),
            container: ContainerId::from(DASHBOARD),
            chart_size,
            textures: HashMap::new(),
            pending: None,
            last_error: None,
        }
    }

    /// Queue a snapshot for the next frame. Only the newest queued snapshot is applied.
    pub fn queue_snapshot(&mut self, snapshot: MetricSnapshot) {
        if self.pending.replace(snapshot).is_some() {
            debug!("superseded a pending chart update");
        }
    }

    pub fn chart_count(&self) -> usize {
        self.manager.handles().len()
    }

    /// Tear down all charts (view unmount / sign out).
    pub fn clear(&mut self) {
        self.pending = None;
        self.manager.dispose();
        self.textures.clear();
        self.last_error = None;
    }

    fn apply_pending(&mut self) {
        let Some(snapshot) = self.pending.take() else {
            return;
        };

        if let Err(e) = snapshot.validate() {
            let err = ChartError::from(e);
            warn!("rejected chart snapshot: {}", err);
            self.last_error = Some(err.to_string());
            return;
        }

        let names = snapshot.available_charts();
        if names.is_empty() {
            self.manager.dispose();
            self.last_error = None;
            return;
        }

        let rendered_here = self.manager.container() == Some(&self.container);
        let result = if rendered_here && self.manager.chart_names() == names.as_slice() {
            self.manager.update(&snapshot).map(|handles| handles.len())
        } else {
            self.manager
                .render(self.container.clone(), &snapshot, &names)
                .map(|handles| handles.len())
        };

        match result {
            Ok(count) => {
                debug!(charts = count, "charts refreshed");
                self.last_error = None;
            }
            Err(e) => {
                warn!("chart refresh failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }
}

impl ChartViewer<BitmapStage> {
    pub fn new(width: u32, height: u32) -> Self {
        let mut stage = BitmapStage::new(width, height);
        stage.add_container(DASHBOARD);
        Self::with_host(stage, (width, height))
    }

    /// Upload new or redrawn surfaces and release textures of destroyed ones.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        let mut live = HashSet::new();
        for (id, bitmap) in self.manager.host().surfaces_in(&self.container) {
            live.insert(id);
            let stale = self
                .textures
                .get(&id)
                .map_or(true, |(revision, _)| *revision != bitmap.revision);
            if stale {
                let image = ColorImage::from_rgb(
                    [bitmap.width as usize, bitmap.height as usize],
                    &bitmap.pixels,
                );
                let texture =
                    ctx.load_texture(format!("chart-{}", id.0), image, TextureOptions::LINEAR);
                self.textures.insert(id, (bitmap.revision, texture));
            }
        }
        self.textures.retain(|id, _| live.contains(id));
    }

    /// Save every live chart as `<name>.png` in `dir`.
    pub fn export_png(&self, dir: &Path) -> Result<usize, image::ImageError> {
        let mut count = 0;
        for (_, bitmap) in self.manager.host().surfaces_in(&self.container) {
            let path = dir.join(format!("{}.png", bitmap.chart));
            image::save_buffer(
                &path,
                &bitmap.pixels,
                bitmap.width,
                bitmap.height,
                image::ColorType::Rgb8,
            )?;
            count += 1;
        }
        Ok(count)
    }

    /// Draw the chart grid. Charts keep their aspect ratio and wrap into columns.
    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        self.apply_pending();
        self.sync_textures(ctx);

        if let Some(err) = &self.last_error {
            ui.label(
                RichText::new(format!("⚠ {}", err))
                    .size(12.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
            ui.add_space(6.0);
        }

        let handles = self.manager.handles();
        if handles.is_empty() {
            ui.label(RichText::new("No charts yet").size(16.0).color(Color32::GRAY));
            return;
        }

        let (width, height) = self.chart_size;
        let avail_width = ui.available_width();
        let card_width = (width as f32).min(avail_width - CHART_SPACING).max(120.0);
        let card_height = card_width * height as f32 / width as f32;
        let num_columns = ((avail_width / (card_width + CHART_SPACING)).floor() as usize).max(1);

        for row in handles.chunks(num_columns) {
            ui.horizontal(|ui| {
                for handle in row {
                    let Some((_, texture)) = self.textures.get(&handle.surface()) else {
                        continue;
                    };
                    egui::Frame::none()
                        .rounding(8.0)
                        .stroke(egui::Stroke::new(1.0, Color32::from_gray(180)))
                        .inner_margin(6.0)
                        .show(ui, |ui| {
                            ui.image((texture.id(), egui::vec2(card_width, card_height)));
                        });
                    ui.add_space(CHART_SPACING);
                }
            });
            ui.add_space(CHART_SPACING);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::testing::RecordingHost;
    use crate::charts::ChartName;
    use crate::snapshot::MetricValues;

    fn viewer() -> ChartViewer<RecordingHost> {
        ChartViewer::with_host(RecordingHost::with_container(DASHBOARD), (100, 60))
    }

    fn scores(values: &[f64]) -> MetricSnapshot {
        let dates = (1..=values.len()).map(|d| format!("d{}", d)).collect();
        MetricSnapshot::with_scores(dates, values.to_vec())
    }

    fn live_values(viewer: &ChartViewer<RecordingHost>, name: ChartName) -> Vec<Option<f64>> {
        let handle = viewer
            .manager
            .handles()
            .iter()
            .find(|h| h.name() == name)
            .unwrap();
        viewer.manager.host().figures[&handle.surface()].series[0]
            .values
            .clone()
    }

    #[test]
    fn only_the_newest_queued_snapshot_is_applied() {
        let mut viewer = viewer();
        viewer.queue_snapshot(scores(&[70.0, 82.0]));
        viewer.queue_snapshot(scores(&[50.0, 60.0, 90.0]));
        viewer.apply_pending();

        assert_eq!(
            live_values(&viewer, ChartName::Score),
            vec![Some(50.0), Some(60.0), Some(90.0)]
        );
        assert_eq!(viewer.chart_count(), 1);
        assert_eq!(viewer.manager.host().surfaces_in(DASHBOARD), 1);
        assert_eq!(viewer.manager.host().appends(), 1);
        assert!(viewer.pending.is_none());
    }

    #[test]
    fn same_chart_set_is_updated_in_place() {
        let mut viewer = viewer();
        viewer.queue_snapshot(scores(&[70.0, 82.0]));
        viewer.apply_pending();
        viewer.queue_snapshot(scores(&[71.0, 83.0]));
        viewer.apply_pending();

        assert_eq!(viewer.manager.chart_names(), &[ChartName::Score]);
        assert_eq!(live_values(&viewer, ChartName::Score), vec![Some(71.0), Some(83.0)]);
        assert_eq!(viewer.manager.host().surfaces_in(DASHBOARD), 1);
        assert!(viewer.last_error.is_none());
    }

    #[test]
    fn different_chart_set_is_rendered_afresh() {
        let mut viewer = viewer();
        viewer.queue_snapshot(scores(&[70.0, 82.0]));
        viewer.apply_pending();

        // no history any more, only current values: update would reject this
        viewer.queue_snapshot(MetricSnapshot {
            current: Some(MetricValues {
                moisture: 45.0,
                ..Default::default()
            }),
            ..Default::default()
        });
        viewer.apply_pending();

        assert!(viewer.last_error.is_none());
        assert_eq!(viewer.manager.chart_names(), &[ChartName::Radar]);
        assert_eq!(viewer.manager.host().surfaces_in(DASHBOARD), 1);
        assert_eq!(viewer.manager.host().appends(), 2);
    }

    #[test]
    fn invalid_snapshot_keeps_live_charts() {
        let mut viewer = viewer();
        viewer.queue_snapshot(scores(&[70.0, 82.0]));
        viewer.apply_pending();

        let mut bad = scores(&[1.0, 2.0]);
        if let Some(history) = bad.history.as_mut() {
            history.scores.pop();
        }
        viewer.queue_snapshot(bad);
        viewer.apply_pending();

        assert!(viewer.last_error.is_some());
        assert_eq!(live_values(&viewer, ChartName::Score), vec![Some(70.0), Some(82.0)]);
    }

    #[test]
    fn clear_releases_everything() {
        let mut viewer = viewer();
        viewer.queue_snapshot(scores(&[70.0]));
        viewer.apply_pending();
        viewer.queue_snapshot(scores(&[80.0]));
        viewer.clear();

        assert_eq!(viewer.chart_count(), 0);
        assert_eq!(viewer.manager.host().surfaces_in(DASHBOARD), 0);
        assert!(viewer.pending.is_none());
    }
}
