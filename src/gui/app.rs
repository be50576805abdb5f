//! Skin Insight Main Application
//! Main window with control panel, analysis results and the chart dashboard.

use crate::api::{AnalysisResult, ApiClient, ApiError, HistoryRecord, LoginResponse, Profile};
use crate::capture::{CapturedImage, MAX_EDGE};
use crate::config::AppConfig;
use crate::gui::{AppState, ChartViewer, ControlPanel, ControlPanelAction, ResultView};
use crate::session::{Session, SessionStore};
use crate::snapshot::MetricSnapshot;
use egui::{ColorImage, RichText, SidePanel, TextureHandle, TextureOptions};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{info, warn};

/// Which request a background result belongs to.
#[derive(Debug, Clone, Copy)]
enum Task {
    Auth,
    Profile,
    Analyze,
    History,
}

/// Result from a background request thread
enum TaskResult {
    LoggedIn(LoginResponse),
    Registered,
    ProfileLoaded(Profile),
    ProfileSaved,
    Analyzed(AnalysisResult),
    HistoryLoaded(Vec<HistoryRecord>),
    Failed { task: Task, error: String },
}

/// Main application window.
pub struct SkinInsightApp {
    ctx: egui::Context,
    client: ApiClient,
    store: SessionStore,
    state: AppState,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    preview: Option<TextureHandle>,

    task_tx: Sender<(u64, TaskResult)>,
    task_rx: Receiver<(u64, TaskResult)>,
    /// Bumped on sign out; results tagged with an older epoch are dropped.
    epoch: u64,
    /// Set when history was requested while a load was already running.
    history_reload: bool,
}

impl SkinInsightApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, client: ApiClient) -> Self {
        let (task_tx, task_rx) = channel();
        let mut app = Self {
            ctx: cc.egui_ctx.clone(),
            client,
            store: SessionStore::new(config.session.file.clone()),
            state: AppState::default(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(config.charts.width, config.charts.height),
            preview: None,
            task_tx,
            task_rx,
            epoch: 0,
            history_reload: false,
        };
        app.restore_session();
        app
    }

    /// Pick up a saved session and reload the user's data.
    fn restore_session(&mut self) {
        match self.store.load() {
            Ok(Some(session)) => {
                info!(user = %session.user.username, "restored session");
                self.start_session(session);
            }
            Ok(None) => self.state.set_status("Please sign in"),
            Err(e) => {
                warn!("ignoring saved session: {}", e);
                self.state.set_status("Please sign in");
            }
        }
    }

    fn start_session(&mut self, session: Session) {
        self.client.set_token(Some(session.token.clone()));
        self.state.set_status(format!("Signed in as {}", session.user.username));
        self.state.session = Some(session);
        self.load_profile();
        self.load_history();
    }

    /// Run `job` on a worker thread and deliver its outcome to the UI thread.
    fn spawn<F>(&self, task: Task, job: F)
    where
        F: FnOnce(ApiClient) -> Result<TaskResult, ApiError> + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.task_tx.clone();
        let ctx = self.ctx.clone();
        let epoch = self.epoch;
        thread::spawn(move || {
            let result = job(client).unwrap_or_else(|e| TaskResult::Failed {
                task,
                error: e.to_string(),
            });
            let _ = tx.send((epoch, result));
            ctx.request_repaint();
        });
    }

    fn handle_login(&mut self) {
        let credentials = self.control_panel.auth_form.clone();
        if credentials.username.is_empty() || credentials.password.is_empty() {
            self.state.set_error("Username and password are required");
            return;
        }
        self.state.in_flight.auth = true;
        self.state.set_status("Signing in...");
        self.spawn(Task::Auth, move |client| {
            client.login(&credentials).map(TaskResult::LoggedIn)
        });
    }

    fn handle_register(&mut self) {
        let credentials = self.control_panel.auth_form.clone();
        if credentials.username.is_empty()
            || credentials.email.is_empty()
            || credentials.password.is_empty()
        {
            self.state.set_error("Username, email and password are required");
            return;
        }
        self.state.in_flight.auth = true;
        self.state.set_status("Creating account...");
        self.spawn(Task::Auth, move |client| {
            client.register(&credentials).map(|_| TaskResult::Registered)
        });
    }

    fn handle_logout(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to remove session file: {}", e);
        }
        self.client.set_token(None);
        self.epoch += 1;
        self.state.sign_out();
        self.chart_viewer.clear();
        self.preview = None;
        self.history_reload = false;
        self.control_panel.reset_auth_form();
        info!("signed out");
    }

    fn load_profile(&mut self) {
        self.state.in_flight.profile = true;
        self.spawn(Task::Profile, |client| {
            client.profile().map(TaskResult::ProfileLoaded)
        });
    }

    fn save_profile(&mut self) {
        let profile = self.state.profile.clone();
        self.state.in_flight.profile = true;
        self.spawn(Task::Profile, move |client| {
            client
                .update_profile(&profile)
                .map(|_| TaskResult::ProfileSaved)
        });
    }

    /// At most one history request runs at a time; a request made meanwhile
    /// is replayed once the running one finishes.
    fn load_history(&mut self) {
        if self.state.in_flight.history {
            self.history_reload = true;
            return;
        }
        self.state.in_flight.history = true;
        self.spawn(Task::History, |client| {
            client.history().map(TaskResult::HistoryLoaded)
        });
    }

    fn handle_browse_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "webp"])
            .pick_file()
        else {
            return;
        };

        match CapturedImage::from_file(&path, MAX_EDGE) {
            Ok(capture) => {
                let image = ColorImage::from_rgba_unmultiplied(
                    [capture.width as usize, capture.height as usize],
                    &capture.preview_rgba,
                );
                self.preview = Some(self.ctx.load_texture(
                    "capture-preview",
                    image,
                    TextureOptions::LINEAR,
                ));
                self.state
                    .set_status(format!("Loaded {}", capture.file_name()));
                self.state.capture = Some(capture);
            }
            Err(e) => {
                warn!(path = %path.display(), "{}", e);
                self.state.set_error(e.to_string());
            }
        }
    }

    fn handle_analyze(&mut self) {
        let Some(capture) = &self.state.capture else {
            return;
        };
        let jpeg = capture.jpeg.clone();
        self.state.in_flight.analyze = true;
        self.state.set_status("Analyzing...");
        self.spawn(Task::Analyze, move |client| {
            client.analyze(jpeg).map(TaskResult::Analyzed)
        });
    }

    fn handle_export_charts(&mut self) {
        if self.chart_viewer.chart_count() == 0 {
            self.state.set_error("No charts to export");
            return;
        }
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        match self.chart_viewer.export_png(&dir) {
            Ok(count) => {
                self.state
                    .set_status(format!("Exported {} charts to {}", count, dir.display()));
                if let Err(e) = open::that(&dir) {
                    warn!("failed to open export folder: {}", e);
                }
            }
            Err(e) => self.state.set_error(format!("Export error: {}", e)),
        }
    }

    /// Check for background results
    fn check_task_results(&mut self) {
        while let Ok((epoch, result)) = self.task_rx.try_recv() {
            if epoch != self.epoch {
                continue;
            }
            match result {
                TaskResult::LoggedIn(response) => {
                    self.state.in_flight.auth = false;
                    let session = Session {
                        token: response.access_token,
                        user: response.user,
                    };
                    if let Err(e) = self.store.save(&session) {
                        warn!("failed to persist session: {}", e);
                    }
                    info!(user = %session.user.username, "signed in");
                    self.control_panel.reset_auth_form();
                    self.start_session(session);
                }
                TaskResult::Registered => {
                    self.state.in_flight.auth = false;
                    self.control_panel.reset_auth_form();
                    self.state.set_status("Account created, please sign in");
                }
                TaskResult::ProfileLoaded(profile) => {
                    self.state.in_flight.profile = false;
                    self.state.profile = profile;
                }
                TaskResult::ProfileSaved => {
                    self.state.in_flight.profile = false;
                    self.control_panel.show_profile = false;
                    self.state.set_status("Profile updated");
                }
                TaskResult::Analyzed(result) => {
                    self.state.in_flight.analyze = false;
                    self.state
                        .set_status(format!("Analysis complete: score {:.1}", result.score));
                    if let Some(snapshot) = self.state.record_analysis(result) {
                        self.chart_viewer.queue_snapshot(snapshot);
                    }
                    self.preview = None;
                    self.load_history();
                }
                TaskResult::HistoryLoaded(records) => {
                    self.state.in_flight.history = false;
                    if !records.is_empty() {
                        self.chart_viewer
                            .queue_snapshot(MetricSnapshot::from_history(&records));
                    }
                    self.state.history = records;
                    if std::mem::take(&mut self.history_reload) {
                        self.load_history();
                    }
                }
                TaskResult::Failed { task, error } => {
                    warn!(?task, "request failed: {}", error);
                    match task {
                        Task::Auth => self.state.in_flight.auth = false,
                        Task::Profile => self.state.in_flight.profile = false,
                        Task::Analyze => self.state.in_flight.analyze = false,
                        Task::History => {
                            self.state.in_flight.history = false;
                            if std::mem::take(&mut self.history_reload) {
                                self.load_history();
                            }
                        }
                    }
                    self.state.set_error(error);
                }
            }
        }
    }

    fn show_main(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if !self.state.is_logged_in() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Sign in to analyze your skin").size(20.0));
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    if let Some(preview) = &self.preview {
                        let size = preview.size_vec2();
                        let scale = (240.0 / size.y).min(1.0);
                        ui.image((preview.id(), size * scale));
                        ui.add_space(15.0);
                    }
                    if let Some(latest) = &self.state.latest {
                        ResultView::draw_latest(ui, latest);
                    }
                });

                ui.add_space(15.0);
                ui.label(RichText::new("📈 Dashboard").size(18.0).strong());
                ui.add_space(8.0);
                self.chart_viewer.show(ctx, ui);

                ui.add_space(15.0);
                ui.label(RichText::new("🕑 History").size(18.0).strong());
                ui.add_space(8.0);
                ResultView::draw_history(ui, &self.state.history);
            });
    }
}

impl eframe::App for SkinInsightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_task_results();

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &mut self.state);

                    match action {
                        ControlPanelAction::Login => self.handle_login(),
                        ControlPanelAction::Register => self.handle_register(),
                        ControlPanelAction::Logout => self.handle_logout(),
                        ControlPanelAction::SaveProfile => self.save_profile(),
                        ControlPanelAction::BrowseImage => self.handle_browse_image(),
                        ControlPanelAction::Analyze => self.handle_analyze(),
                        ControlPanelAction::RefreshHistory => self.load_history(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - results, charts and history
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_main(ctx, ui);
        });
    }
}
