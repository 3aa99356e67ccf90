//! Calimate Main Application
//! Main window: instrument panel, result table and status bar.

use crate::config::AppConfig;
use crate::gui::result_view::ResultViewAction;
use crate::gui::{InstrumentPanel, ResultView};
use crate::instrument::Connector;
use crate::session::{Session, SessionEvent};
use egui::SidePanel;

/// Work announced this frame, run once its message has been painted.
struct Pending {
    event: SessionEvent,
    frames_waited: u8,
}

/// Main application window.
pub struct CalimateApp {
    session: Session,
    instrument_panel: InstrumentPanel,
    result_view: ResultView,
    pending: Option<Pending>,
}

impl CalimateApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig, connector: Connector) -> Self {
        Self {
            session: Session::new(config, connector),
            instrument_panel: InstrumentPanel::new(),
            result_view: ResultView::new(),
            pending: None,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, event: SessionEvent) {
        if let Some(follow_up) = self.session.handle(event) {
            self.pending = Some(Pending {
                event: follow_up,
                frames_waited: 0,
            });
            ctx.request_repaint();
        }
    }

    /// Run pending work one frame after it was announced.
    fn run_pending(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if pending.frames_waited == 0 {
            pending.frames_waited += 1;
            ctx.request_repaint();
            return;
        }
        if let Some(pending) = self.pending.take() {
            self.dispatch(ctx, pending.event);
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self, ctx: &egui::Context) {
        if self.pending.is_some() {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .set_title("Import CSV")
            .add_filter("CSV Files", &["csv"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.dispatch(ctx, SessionEvent::ImportRequested(path));
        }
    }
}

impl eframe::App for CalimateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_pending(ctx);

        let mut event = None;
        let mut browse = false;

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(&self.session.status);
        });

        // Left panel - Instruments and detail view
        SidePanel::left("instrument_panel")
            .resizable(true)
            .default_width(420.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                event = self.instrument_panel.show(
                    ui,
                    &self.session.instruments,
                    &self.session.detail,
                );
            });

        // Central panel - Result table
        egui::CentralPanel::default().show(ctx, |ui| {
            match self
                .result_view
                .show(ui, &self.session.table, &self.session.config)
            {
                Some(ResultViewAction::BrowseCsv) => browse = true,
                Some(ResultViewAction::Session(e)) => event = Some(e),
                None => {}
            }
        });

        if browse {
            self.handle_browse_csv(ctx);
        }
        if let Some(event) = event {
            if self.pending.is_none() {
                self.dispatch(ctx, event);
            }
        }
    }
}
