//! Bitmap Stage
//! In-memory `SurfaceHost`: every surface is an RGB pixel buffer painted by
//! `FigureRenderer`. The GUI presents these buffers as textures.

use crate::charts::{
    ChartError, ChartFigure, ChartName, ContainerId, DisposalError, FigureRenderer, SurfaceHost,
    SurfaceId,
};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// One drawing surface.
pub struct Bitmap {
    pub chart: ChartName,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Bumped on every successful draw.
    pub revision: u64,
}

impl Bitmap {
    fn blank(chart: ChartName, width: u32, height: u32) -> Self {
        Self {
            chart,
            width,
            height,
            pixels: vec![255; (width * height * 3) as usize],
            revision: 0,
        }
    }
}

/// Containers of bitmap surfaces, in append order.
pub struct BitmapStage {
    width: u32,
    height: u32,
    containers: BTreeMap<ContainerId, Vec<SurfaceId>>,
    surfaces: HashMap<SurfaceId, Bitmap>,
    next_id: u64,
}

impl BitmapStage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            containers: BTreeMap::new(),
            surfaces: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn add_container(&mut self, id: impl Into<ContainerId>) {
        self.containers.entry(id.into()).or_default();
    }

    /// Surfaces of `container` in append order.
    pub fn surfaces_in<'a>(
        &'a self,
        container: &ContainerId,
    ) -> impl Iterator<Item = (SurfaceId, &'a Bitmap)> + 'a {
        self.containers
            .get(container)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.surfaces.get(id).map(|bitmap| (*id, bitmap)))
    }
}

impl SurfaceHost for BitmapStage {
    fn has_container(&self, container: &ContainerId) -> bool {
        self.containers.contains_key(container)
    }

    fn append_surface(
        &mut self,
        container: &ContainerId,
        chart: ChartName,
    ) -> Result<SurfaceId, ChartError> {
        let list = self
            .containers
            .get_mut(container)
            .ok_or_else(|| ChartError::ContainerNotFound(container.clone()))?;

        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        list.push(id);
        self.surfaces
            .insert(id, Bitmap::blank(chart, self.width, self.height));
        debug!(container = %container, surface = %id, chart = %chart, "appended surface");
        Ok(id)
    }

    fn draw(&mut self, surface: SurfaceId, figure: &ChartFigure) -> Result<(), ChartError> {
        let bitmap = self.surfaces.get_mut(&surface).ok_or_else(|| ChartError::Draw {
            chart: figure.name,
            reason: format!("surface {} does not exist", surface),
        })?;

        FigureRenderer::draw(&mut bitmap.pixels, (bitmap.width, bitmap.height), figure).map_err(
            |e| ChartError::Draw {
                chart: figure.name,
                reason: e.to_string(),
            },
        )?;
        bitmap.revision += 1;
        Ok(())
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), DisposalError> {
        if self.surfaces.remove(&surface).is_none() {
            return Err(DisposalError {
                surface,
                reason: "surface already released".to_string(),
            });
        }
        for list in self.containers.values_mut() {
            list.retain(|id| *id != surface);
        }
        Ok(())
    }
}
