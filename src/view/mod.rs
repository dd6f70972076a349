//! View Model
//!
//! Turns fetched payloads into a chart-ready model and folds the two fetch
//! results into a single view state.

mod model;
mod state;

pub use model::{build_chart_model, ChartModel, ChartSeries, ViewModelBuilder};
pub use model::{TOTAL_ACCIDENTS, TOTAL_DEATHS};
pub use state::{QueryState, ViewState};
