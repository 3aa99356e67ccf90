//! Instrument Panel Widget
//! Left side panel: instrument search, one button per discovered instrument,
//! and the read-only detail view.

use crate::instrument::InstrumentDescriptor;
use crate::session::SessionEvent;
use egui::{Color32, RichText, ScrollArea, TextEdit, TextStyle};

const BUTTON_HEIGHT: f32 = 28.0;

#[derive(Default)]
pub struct InstrumentPanel;

impl InstrumentPanel {
    pub fn new() -> Self {
        Self
    }

    /// Draw the panel. Returns the event for whichever button was clicked.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        instruments: &[InstrumentDescriptor],
        detail: &str,
    ) -> Option<SessionEvent> {
        let mut event = None;

        let width = ui.available_width();
        if ui
            .add_sized([width, BUTTON_HEIGHT], egui::Button::new("Search"))
            .clicked()
        {
            event = Some(SessionEvent::SearchRequested);
        }

        ui.add_space(5.0);

        if instruments.is_empty() {
            ui.label(
                RichText::new("No instruments")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
        for (index, instrument) in instruments.iter().enumerate() {
            let button = egui::Button::new(instrument.identity.label()).min_size(egui::vec2(width, 0.0));
            if ui
                .add(button)
                .on_hover_text(&instrument.resource)
                .clicked()
            {
                event = Some(SessionEvent::InstrumentSelected(index));
            }
        }

        ui.add_space(10.0);
        ui.separator();

        ScrollArea::vertical()
            .id_salt("detail")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let mut text = detail;
                ui.add(
                    TextEdit::multiline(&mut text)
                        .font(TextStyle::Monospace)
                        .desired_width(f32::INFINITY),
                );
            });

        event
    }
}
