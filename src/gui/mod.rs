//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod result_view;
mod state;

pub use app::SkinInsightApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use result_view::ResultView;
pub use state::{AppState, InFlight};
