//! Control Panel Widget
//! Left side panel: sign-in, profile, photo capture and actions.

use crate::api::Credentials;
use crate::gui::AppState;
use egui::{Color32, ComboBox, RichText};

const SKIN_TYPES: [&str; 5] = ["dry", "oily", "combination", "normal", "sensitive"];
const GENDERS: [&str; 3] = ["female", "male", "other"];

/// Left side control panel.
pub struct ControlPanel {
    pub auth_form: Credentials,
    pub is_login: bool,
    pub show_profile: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            auth_form: Credentials::default(),
            is_login: true,
            show_profile: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch back to the login form with empty fields.
    pub fn reset_auth_form(&mut self) {
        self.auth_form = Credentials::default();
        self.is_login = true;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut AppState) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🔬 Skin Insight")
                    .size(22.0)
                    .color(Color32::from_rgb(54, 162, 235)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        if state.is_logged_in() {
            self.show_account(ui, state, &mut action);
        } else {
            self.show_auth_form(ui, state, &mut action);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if state.status_is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&state.status).size(11.0).color(status_color));

        action
    }

    fn show_auth_form(
        &mut self,
        ui: &mut egui::Ui,
        state: &AppState,
        action: &mut ControlPanelAction,
    ) {
        let heading = if self.is_login { "🔑 Sign In" } else { "📝 Register" };
        ui.label(RichText::new(heading).size(14.0).strong());
        ui.add_space(5.0);

        let label_width = 80.0;
        egui::Grid::new("auth_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Username:"));
                ui.text_edit_singleline(&mut self.auth_form.username);
                ui.end_row();

                ui.add_sized([label_width, 20.0], egui::Label::new("Email:"));
                ui.text_edit_singleline(&mut self.auth_form.email);
                ui.end_row();

                ui.add_sized([label_width, 20.0], egui::Label::new("Password:"));
                ui.add(egui::TextEdit::singleline(&mut self.auth_form.password).password(true));
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!state.in_flight.auth, |ui| {
                let label = if self.is_login { "Sign In" } else { "Create Account" };
                let button = egui::Button::new(RichText::new(label).size(15.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    *action = if self.is_login {
                        ControlPanelAction::Login
                    } else {
                        ControlPanelAction::Register
                    };
                }
            });

            let toggle = if self.is_login {
                "No account? Register"
            } else {
                "Have an account? Sign in"
            };
            if ui.link(toggle).clicked() {
                self.is_login = !self.is_login;
            }
        });
    }

    fn show_account(
        &mut self,
        ui: &mut egui::Ui,
        state: &mut AppState,
        action: &mut ControlPanelAction,
    ) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("👤 {}", state.username().unwrap_or_default()))
                    .size(14.0)
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Sign out").clicked() {
                    *action = ControlPanelAction::Logout;
                }
            });
        });
        ui.add_space(8.0);

        // ===== Profile Section =====
        ui.toggle_value(&mut self.show_profile, "⚙ Profile");
        if self.show_profile {
            self.show_profile_editor(ui, state, action);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Capture Section =====
        ui.label(RichText::new("📷 Skin Photo").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = state
                        .capture
                        .as_ref()
                        .map(|c| c.file_name())
                        .unwrap_or_else(|| "No photo selected".to_string());
                    ui.label(RichText::new(name).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            *action = ControlPanelAction::BrowseImage;
                        }
                    });
                });
            });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            let can_analyze = state.capture.is_some() && !state.in_flight.analyze;
            ui.add_enabled_ui(can_analyze, |ui| {
                let button = egui::Button::new(RichText::new("▶ Analyze").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    *action = ControlPanelAction::Analyze;
                }
            });
            if state.in_flight.analyze {
                ui.add(egui::Spinner::new());
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!state.in_flight.history, |ui| {
                    if ui.button("🔄 Refresh History").clicked() {
                        *action = ControlPanelAction::RefreshHistory;
                    }
                });
                if ui.button("💾 Export Charts").clicked() {
                    *action = ControlPanelAction::ExportCharts;
                }
            });
        });
    }

    fn show_profile_editor(
        &mut self,
        ui: &mut egui::Ui,
        state: &mut AppState,
        action: &mut ControlPanelAction,
    ) {
        let profile = &mut state.profile;
        egui::Grid::new("profile_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Age:");
                let mut age = profile.age.unwrap_or(0);
                if ui
                    .add(egui::DragValue::new(&mut age).range(0..=120))
                    .changed()
                {
                    profile.age = (age > 0).then_some(age);
                }
                ui.end_row();

                ui.label("Gender:");
                ComboBox::from_id_salt("gender")
                    .width(150.0)
                    .selected_text(&profile.gender)
                    .show_ui(ui, |ui| {
                        for gender in GENDERS {
                            ui.selectable_value(&mut profile.gender, gender.to_string(), gender);
                        }
                    });
                ui.end_row();

                ui.label("Skin type:");
                ComboBox::from_id_salt("skin_type")
                    .width(150.0)
                    .selected_text(&profile.skin_type)
                    .show_ui(ui, |ui| {
                        for skin_type in SKIN_TYPES {
                            ui.selectable_value(
                                &mut profile.skin_type,
                                skin_type.to_string(),
                                skin_type,
                            );
                        }
                    });
                ui.end_row();

                ui.label("Concerns:");
                ui.text_edit_multiline(&mut profile.concerns);
                ui.end_row();
            });

        ui.add_enabled_ui(!state.in_flight.profile, |ui| {
            if ui.button("Save Profile").clicked() {
                *action = ControlPanelAction::SaveProfile;
            }
        });
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Login,
    Register,
    Logout,
    SaveProfile,
    BrowseImage,
    Analyze,
    RefreshHistory,
    ExportCharts,
}
