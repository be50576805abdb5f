//! Result View
//! Latest analysis card and the history table.

use crate::api::{AnalysisResult, HistoryRecord};
use egui::{Color32, RichText};

pub struct ResultView;

impl ResultView {
    fn score_color(score: f64) -> Color32 {
        if score >= 80.0 {
            Color32::from_rgb(40, 167, 69)
        } else if score >= 60.0 {
            Color32::from_rgb(243, 156, 18)
        } else {
            Color32::from_rgb(220, 53, 69)
        }
    }

    /// Draw the latest result with its recommendations.
    pub fn draw_latest(ui: &mut egui::Ui, result: &AnalysisResult) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Skin score").size(16.0).strong());
                    ui.label(
                        RichText::new(format!("{:.1}", result.score))
                            .size(28.0)
                            .strong()
                            .color(Self::score_color(result.score)),
                    );
                });
                ui.add_space(6.0);

                for (label, value) in [
                    ("Moisture", result.moisture),
                    ("Oil", result.oil),
                    ("Sensitivity", result.sensitivity),
                ] {
                    ui.horizontal(|ui| {
                        ui.add_sized([90.0, 18.0], egui::Label::new(label));
                        ui.add(
                            egui::ProgressBar::new((value / 100.0).clamp(0.0, 1.0) as f32)
                                .desired_width(220.0)
                                .text(format!("{:.1}", value)),
                        );
                    });
                }

                if !result.recommendations.is_empty() {
                    ui.add_space(8.0);
                    ui.label(RichText::new("Recommendations").size(14.0).strong());
                    for line in result.recommendations.lines().filter(|l| !l.trim().is_empty()) {
                        ui.label(format!("• {}", line.trim()));
                    }
                }
            });
    }

    /// Draw the history table, newest first.
    pub fn draw_history(ui: &mut egui::Ui, history: &[HistoryRecord]) {
        if history.is_empty() {
            ui.label(RichText::new("No history yet").color(Color32::GRAY));
            return;
        }

        egui::Grid::new("history_table")
            .striped(true)
            .min_col_width(70.0)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for header in ["Date", "Score", "Moisture", "Oil", "Sensitivity"] {
                    ui.label(RichText::new(header).strong().size(12.0));
                }
                ui.end_row();

                for record in HistoryRecord::chronological(history).into_iter().rev() {
                    ui.label(RichText::new(record.date_label()).size(12.0));
                    ui.label(
                        RichText::new(format!("{:.1}", record.score))
                            .size(12.0)
                            .color(Self::score_color(record.score)),
                    );
                    ui.label(RichText::new(format!("{:.1}", record.moisture)).size(12.0));
                    ui.label(RichText::new(format!("{:.1}", record.oil)).size(12.0));
                    ui.label(RichText::new(format!("{:.1}", record.sensitivity)).size(12.0));
                    ui.end_row();
                }
            });
    }
}
