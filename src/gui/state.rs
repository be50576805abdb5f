//! Application State
//! Everything the views share, owned by the top-level app and lent to panels.

use crate::api::{AnalysisResult, HistoryRecord, Profile};
use crate::capture::CapturedImage;
use crate::session::Session;
use crate::snapshot::MetricSnapshot;

/// Requests currently running on worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct InFlight {
    pub auth: bool,
    pub profile: bool,
    pub analyze: bool,
    pub history: bool,
}

#[derive(Default)]
pub struct AppState {
    pub session: Option<Session>,
    pub profile: Profile,
    pub latest: Option<AnalysisResult>,
    pub history: Vec<HistoryRecord>,
    pub capture: Option<CapturedImage>,
    pub in_flight: InFlight,
    pub status: String,
    pub status_is_error: bool,
}

impl AppState {
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.username.as_str())
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = true;
    }

    /// Keep a fresh analysis result and drop the uploaded capture.
    /// Returns a dashboard snapshot only while no history is loaded; otherwise
    /// the history reload that follows an analysis refreshes the charts.
    pub fn record_analysis(&mut self, result: AnalysisResult) -> Option<MetricSnapshot> {
        let snapshot = self
            .history
            .is_empty()
            .then(|| MetricSnapshot::from_analysis(&result));
        self.latest = Some(result);
        self.capture = None;
        snapshot
    }

    /// Forget everything tied to the signed-in user.
    pub fn sign_out(&mut self) {
        *self = Self {
            status: "Signed out".to_string(),
            ..Self::default()
        };
    }
}
