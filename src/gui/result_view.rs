//! Result View Widget
//! Sortable, color-coded grid of imported results with the Import CSV button.

use crate::config::AppConfig;
use crate::data::{ResultTable, Row, SortOrder, COLUMNS, NOTES_COLUMN};
use crate::session::SessionEvent;
use egui::epaint::Fonts;
use egui::{Color32, FontId, RichText, TextStyle};
use egui_extras::{Column, TableBuilder};

const CELL_PADDING: f32 = 6.0;
const MIN_COLUMN_WIDTH: f32 = 40.0;

/// What the user asked for in the result view this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultViewAction {
    BrowseCsv,
    Session(SessionEvent),
}

#[derive(Default)]
pub struct ResultView {
    /// Notes column width seen on the last frame. Row heights are laid out
    /// against it because the table only knows widths while drawing.
    notes_width: Option<f32>,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        table: &ResultTable,
        config: &AppConfig,
    ) -> Option<ResultViewAction> {
        let mut action = None;

        egui::TopBottomPanel::bottom("table_buttons")
            .show_separator_line(false)
            .show_inside(ui, |ui| {
                ui.add_space(4.0);
                let width = ui.available_width();
                if ui
                    .add_sized([width, 28.0], egui::Button::new("Import CSV"))
                    .clicked()
                {
                    action = Some(ResultViewAction::BrowseCsv);
                }
            });

        egui::CentralPanel::default().show_inside(ui, |ui| {
            if table.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0).color(Color32::GRAY));
                });
                return;
            }
            if let Some(event) = self.draw_table(ui, table, config) {
                action = Some(ResultViewAction::Session(event));
            }
        });

        action
    }

    fn draw_table(
        &mut self,
        ui: &mut egui::Ui,
        table: &ResultTable,
        config: &AppConfig,
    ) -> Option<SessionEvent> {
        let mut event = None;
        let mut measured_width = None;

        let font_id = TextStyle::Monospace.resolve(ui.style());
        let notes_width = self
            .notes_width
            .unwrap_or(config.column_widths[NOTES_COLUMN])
            .max(MIN_COLUMN_WIDTH);
        let heights: Vec<f32> = ui.fonts(|fonts| {
            table
                .rows()
                .iter()
                .map(|row| row_height(fonts, row, &font_id, notes_width, config.auto_row_height))
                .collect()
        });

        let [test_width, result_width, _] = config.column_widths;
        let builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .sense(egui::Sense::click())
            .cell_layout(egui::Layout::top_down(egui::Align::Min))
            .column(Column::initial(test_width).at_least(MIN_COLUMN_WIDTH))
            .column(Column::initial(result_width).at_least(MIN_COLUMN_WIDTH))
            .column(Column::remainder().at_least(MIN_COLUMN_WIDTH))
            .min_scrolled_height(0.0);

        builder
            .header(22.0, |mut header| {
                for (column, name) in COLUMNS.iter().enumerate() {
                    header.col(|ui| {
                        let arrow = match table.sort_state() {
                            Some((sorted, order)) if sorted == column => match order {
                                SortOrder::Ascending => " ▲",
                                SortOrder::Descending => " ▼",
                            },
                            _ => "",
                        };
                        let label = RichText::new(format!("{}{}", name, arrow)).strong();
                        if ui.add(egui::Button::new(label).frame(false)).clicked() {
                            event = Some(SessionEvent::SortRequested(column));
                        }
                    });
                }
            })
            .body(|body| {
                body.heterogeneous_rows(heights.into_iter(), |mut row| {
                    let index = row.index();
                    let Some(data) = table.row(index) else {
                        return;
                    };
                    row.set_selected(table.selected() == Some(index));

                    for column in 0..COLUMNS.len() {
                        row.col(|ui| {
                            if let Some(highlight) = data.highlight(column) {
                                let [r, g, b, a] = highlight.rgba();
                                ui.painter().rect_filled(
                                    ui.max_rect(),
                                    0.0,
                                    Color32::from_rgba_unmultiplied(r, g, b, a),
                                );
                            }
                            let text = RichText::new(data.field(column)).monospace();
                            let label = egui::Label::new(text).selectable(false);
                            if column == NOTES_COLUMN {
                                measured_width = Some(ui.available_width());
                                ui.add(label.wrap());
                            } else {
                                ui.add(label.truncate());
                            }
                        });
                    }

                    if row.response().clicked() {
                        event = Some(SessionEvent::RowSelected(index));
                    }
                });
            });

        // A resized Notes column changes how many lines each row wraps to.
        if let Some(width) = measured_width {
            if self.notes_width.map_or(true, |old| (old - width).abs() > 0.5) {
                self.notes_width = Some(width);
                ui.ctx().request_repaint();
            }
        }

        event
    }
}

/// Number of lines `text` wraps to at `width`.
fn wrapped_rows(fonts: &Fonts, text: &str, font_id: &FontId, width: f32) -> usize {
    fonts
        .layout(text.to_owned(), font_id.clone(), Color32::WHITE, width)
        .rows
        .len()
        .max(1)
}

/// Height of a table row whose Notes cell is `notes_width` wide.
fn row_height(fonts: &Fonts, row: &Row, font_id: &FontId, notes_width: f32, auto: bool) -> f32 {
    let line_height = fonts.row_height(font_id);
    if !auto {
        return line_height + CELL_PADDING;
    }
    let lines = wrapped_rows(fonts, &row.notes, font_id, notes_width).max(row.line_count());
    lines as f32 * line_height + CELL_PADDING
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs `f` inside a frame so the font atlas is loaded.
    fn with_fonts<R: Default>(f: impl Fn(&Fonts) -> R) -> R {
        let ctx = egui::Context::default();
        let mut out = R::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            out = ctx.fonts(|fonts| f(fonts));
        });
        out
    }

    #[test]
    fn narrow_notes_column_wraps_to_more_lines() {
        let font_id = FontId::monospace(12.0);
        let notes = "offset drift within limits ".repeat(12);

        let (narrow, wide) = with_fonts(|fonts| {
            (
                wrapped_rows(fonts, &notes, &font_id, 120.0),
                wrapped_rows(fonts, &notes, &font_id, 10_000.0),
            )
        });

        assert_eq!(wide, 1);
        assert!(narrow > wide);
    }

    #[test]
    fn row_height_follows_notes_width() {
        let font_id = FontId::monospace(12.0);
        let row = Row::new(
            "DC Gain Ch2",
            "Fail",
            "measured 1.031 V/V, limit 0.98 - 1.02 ".repeat(8),
        );

        let (narrow, wide, fixed) = with_fonts(|fonts| {
            (
                row_height(fonts, &row, &font_id, 100.0, true),
                row_height(fonts, &row, &font_id, 10_000.0, true),
                row_height(fonts, &row, &font_id, 100.0, false),
            )
        });

        assert!(narrow > wide);
        assert_eq!(wide, fixed);
    }

    #[test]
    fn empty_notes_take_one_line() {
        let font_id = FontId::monospace(12.0);
        let rows = with_fonts(|fonts| wrapped_rows(fonts, "", &font_id, 200.0));
        assert_eq!(rows, 1);
    }
}
