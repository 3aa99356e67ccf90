//! GUI module - User interface components

mod app;
mod instrument_panel;
mod result_view;

pub use app::CalimateApp;
pub use instrument_panel::InstrumentPanel;
pub use result_view::ResultView;
