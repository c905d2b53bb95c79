use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::chart::ValueAxis;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – trace toggles
// ---------------------------------------------------------------------------

/// Render the left panel: one collapsible group of checkboxes per value axis.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Series");
    ui.separator();

    let Some(chart) = &state.chart else {
        ui.label("No chart yet.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let groups: Vec<(ValueAxis, &str, Vec<(usize, String)>)> = vec![
        (
            ValueAxis::Emotion,
            "Emotions",
            chart
                .traces_on(ValueAxis::Emotion)
                .map(|(i, t)| (i, t.name.clone()))
                .collect(),
        ),
        (
            ValueAxis::Covid,
            "COVID statistics",
            chart
                .traces_on(ValueAxis::Covid)
                .map(|(i, t)| (i, t.name.clone()))
                .collect(),
        ),
    ];

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (axis, title, entries) in &groups {
                let n_shown = entries
                    .iter()
                    .filter(|(i, _)| state.visible.get(*i).copied().unwrap_or(false))
                    .count();
                let header_text = format!("{title}  ({n_shown}/{})", entries.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(*title)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.set_axis_visible(*axis, true);
                            }
                            if ui.small_button("None").clicked() {
                                state.set_axis_visible(*axis, false);
                            }
                        });

                        for (idx, name) in entries {
                            let color = state.colors.get(*idx).copied().unwrap_or(Color32::GRAY);
                            let mut checked = state.visible.get(*idx).copied().unwrap_or(false);
                            if ui
                                .checkbox(&mut checked, RichText::new(name).color(color))
                                .changed()
                            {
                                state.toggle(*idx);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open emotion index…").clicked() {
                open_emotion_index_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open COVID data…").clicked() {
                open_covid_dialog(state);
                ui.close_menu();
            }
            let can_save = state.emotions.is_some();
            if ui
                .add_enabled(can_save, egui::Button::new("Save emotion index…"))
                .clicked()
            {
                save_emotion_index_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("From");
        ui.add(DatePickerButton::new(&mut state.start).id_salt("range_start"));
        ui.label("to");
        ui.add(DatePickerButton::new(&mut state.end).id_salt("range_end"));
        if ui.button("Fetch tweets").clicked() {
            state.draw_range();
        }

        ui.separator();

        if let Some(chart) = &state.chart {
            ui.label(format!(
                "{}, {}/{} series shown",
                chart.range_label(),
                state.visible_count(),
                chart.traces.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_emotion_index_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emotion index")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.draw_saved(path);
    }
}

pub fn open_covid_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open COVID data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_covid(path);
    }
}

pub fn save_emotion_index_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save emotion index")
        .add_filter("CSV", &["csv"])
        .set_file_name(crate::data::store::DEFAULT_EMOTION_INDEX)
        .save_file();

    if let Some(path) = file {
        state.save_emotions(&path);
    }
}
