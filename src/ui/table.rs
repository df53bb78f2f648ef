use eframe::egui::{self, Align, Layout, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::ui::placeholder;
use crate::view::ViewSlot;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Data tab – raw records of the applied selection
// ---------------------------------------------------------------------------

/// Render the paginated raw data table.
pub fn table_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = &state.view else {
        ui.label("No dataset loaded.");
        return;
    };
    let table = match &view.table {
        ViewSlot::Placeholder(message) => {
            placeholder(ui, message);
            return;
        }
        ViewSlot::Ready(table) => table,
    };

    ui.heading(table.title.as_str());

    let pages = table.page_count().max(1);
    let mut page = state.table_page.min(pages - 1);
    ui.horizontal(|ui: &mut Ui| {
        if ui.add_enabled(page > 0, egui::Button::new("◀")).clicked() {
            page -= 1;
        }
        ui.label(format!("Page {} / {pages}", page + 1));
        if ui.add_enabled(page + 1 < pages, egui::Button::new("▶")).clicked() {
            page += 1;
        }
        ui.label(format!("{} rows", table.rows.len()));
    });

    let rows = table.page(page);
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::initial(100.0).at_least(60.0).clip(true), table.columns.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.vertical_centered(|ui: &mut Ui| {
                            ui.strong(name.as_str());
                        });
                    });
                }
            })
            .body(|mut body| {
                for values in rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        for value in values {
                            row.col(|ui: &mut Ui| {
                                ui.label(value.to_string());
                            });
                        }
                    });
                }
            });
    });

    state.table_page = page;
}
