use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::ResultsTable;
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – figure list
// ---------------------------------------------------------------------------

/// Render the left panel: built figures first, then the ones that failed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Figures");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if state.figures.is_empty() {
                ui.label("No figures.");
            }

            let mut clicked = None;
            for (idx, figure) in state.figures.iter().enumerate() {
                let selected = state.view == View::Chart && state.selected == Some(idx);
                let text = if figure.is_empty() {
                    RichText::new(&figure.name).weak()
                } else {
                    RichText::new(&figure.name)
                };
                if ui.selectable_label(selected, text).on_hover_text(figure.title.as_str()).clicked() {
                    clicked = Some(idx);
                }
            }
            if let Some(idx) = clicked {
                state.select(idx);
            }

            if !state.failures.is_empty() {
                ui.add_space(8.0);
                egui::CollapsingHeader::new(
                    RichText::new(format!("Failed ({})", state.failures.len())).color(Color32::RED),
                )
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for failure in &state.failures {
                        ui.label(RichText::new(&failure.what).strong())
                            .on_hover_text(failure.reason.as_str());
                        ui.label(RichText::new(&failure.reason).small());
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
            if ui.button("Open table…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} figures, {} failed",
            state.figures.len(),
            state.failures.len()
        ));

        if let Some(table) = &state.table {
            ui.separator();
            if ui.selectable_label(state.view == View::Chart, "Chart").clicked() {
                state.view = View::Chart;
            }
            let name = table
                .source()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Table".to_string());
            if ui.selectable_label(state.view == View::Table, name).clicked() {
                state.view = View::Table;
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

/// Render `table` as a striped, scrollable grid.
pub fn table_view(ui: &mut Ui, table: &ResultsTable) {
    ui.label(format!(
        "{}: {} rows × {} columns",
        table.source().display(),
        table.len(),
        table.columns().len()
    ));
    ui.separator();

    let rows = table.rows();
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(TableColumn::auto().at_least(60.0), table.columns().len())
            .header(20.0, |mut header| {
                for column in table.columns() {
                    header.col(|ui| {
                        ui.strong(column.name.as_str()).on_hover_text(format!("{:?}", column.kind));
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open results table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    table.len(),
                    table.column_names().collect::<Vec<_>>(),
                    path.display()
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
