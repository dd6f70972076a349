//! Chart Rendering
//!
//! Maps a [`ViewState`] to what the user sees: a loading indicator, an
//! error message, or an area chart with two series.
//!
//! The chart itself is described by [`ChartOptions`], a serializable set of
//! chart-library options, so any front end can draw it. [`RenderedView::to_text`]
//! draws a plain terminal version.

mod options;
mod text;

pub use options::ChartOptions;

use serde::Serialize;

use crate::config::ChartConfig;
use crate::view::{ChartSeries, ViewState};

/// Message shown while either query is in flight
pub const LOADING_MESSAGE: &str = "Loading...";

/// Message shown when either query failed
pub const ERROR_MESSAGE: &str = "Error";

/// Legend line for one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
    /// Month range covered, e.g. `"2023-01 - 2023-12"`
    pub period: Option<String>,
}

/// Visual output for a view state
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderedView {
    Loading,
    Error {
        message: String,
    },
    Chart {
        options: ChartOptions,
        series: Vec<ChartSeries>,
        legend: Vec<LegendEntry>,
    },
}

/// Render a view state with the given chart settings
pub fn render(state: &ViewState, config: &ChartConfig) -> RenderedView {
    match state {
        ViewState::Loading => RenderedView::Loading,
        ViewState::Error => RenderedView::Error {
            message: ERROR_MESSAGE.to_string(),
        },
        ViewState::Ready(model) => {
            let period = model.period();
            let legend = model
                .series
                .iter()
                .zip(&config.colors)
                .map(|(series, color)| LegendEntry {
                    name: series.name.clone(),
                    color: color.clone(),
                    period: period.clone(),
                })
                .collect();

            RenderedView::Chart {
                options: ChartOptions::area(config, model.categories.clone()),
                series: model.series.to_vec(),
                legend,
            }
        }
    }
}

impl RenderedView {
    pub fn is_chart(&self) -> bool {
        matches!(self, RenderedView::Chart { .. })
    }

    /// Serialize for a front end
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering with bars up to `width` characters
    pub fn to_text(&self, width: usize) -> String {
        match self {
            RenderedView::Loading => LOADING_MESSAGE.to_string(),
            RenderedView::Error { message } => message.clone(),
            RenderedView::Chart {
                options,
                series,
                legend,
            } => text::draw(options, series, legend, width),
        }
    }
}
