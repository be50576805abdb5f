//! Charts module - Chart policy, rendering and lifecycle

mod bitmap;
mod manager;
mod policy;
mod renderer;
mod surface;
#[cfg(test)]
pub(crate) mod testing;

pub use bitmap::{Bitmap, BitmapStage};
pub use manager::{ChartError, ChartHandle, ChartLifecycleManager};
pub use policy::{AxisBounds, ChartFigure, ChartName, Encoding, FigureSeries};
pub use renderer::FigureRenderer;
pub use surface::{ContainerId, DisposalError, SurfaceHost, SurfaceId};
