//! Drawing Surface Abstractions
//! A `SurfaceHost` owns containers and the drawing surfaces appended to them.

use crate::charts::{ChartError, ChartFigure, ChartName};
use std::fmt;
use thiserror::Error;

/// Identifier of a container that drawing surfaces are appended to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque id of one drawing surface. Never reused by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to dispose surface {surface}: {reason}")]
pub struct DisposalError {
    pub surface: SurfaceId,
    pub reason: String,
}

/// Backend that creates, paints and frees drawing surfaces.
pub trait SurfaceHost {
    fn has_container(&self, container: &ContainerId) -> bool;

    /// Append a new, blank surface for `chart` to `container`.
    fn append_surface(
        &mut self,
        container: &ContainerId,
        chart: ChartName,
    ) -> Result<SurfaceId, ChartError>;

    fn draw(&mut self, surface: SurfaceId, figure: &ChartFigure) -> Result<(), ChartError>;

    /// Free the surface and its graphics resources.
    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), DisposalError>;
}
