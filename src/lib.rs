//! # Accident Trends
//!
//! Fetches monthly accident and death statistics from a REST endpoint and
//! turns them into a dual-series area chart, with explicit loading and error
//! states.
//!
//! ## Modules
//!
//! - [`data`]: Payload types served by the statistics API
//! - [`fetch`]: HTTP source and the process-wide query cache
//! - [`view`]: Chart model builder and view state reducer
//! - [`render`]: View state → loading indicator, error message or chart
//! - [`component`]: Mount lifecycle tying the above together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use accident_trends::{AccidentChart, ChartDeps, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let deps = ChartDeps::http(&config)?;
//!
//!     let chart = AccidentChart::mount(&deps, &config);
//!     chart.settled().await;
//!
//!     println!("{}", chart.render().to_text(40));
//!     Ok(())
//! }
//! ```

pub mod component;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod render;
pub mod view;

pub use component::{AccidentChart, ChartDeps};

pub use config::{generate_default_config, ChartConfig, Config, ConfigError, LoggingConfig, SourceConfig};

pub use data::{AccidentDataByMonth, MonthlyAccidentRecord, MonthlyDeathRecord};

pub use error::{Error, Result};

pub use fetch::{CacheEntry, FetchError, HttpSource, MonthlySource, QueryCache, QueryKey, QueryStatus};

pub use render::{render, ChartOptions, LegendEntry, RenderedView};

pub use view::{build_chart_model, ChartModel, ChartSeries, QueryState, ViewModelBuilder, ViewState};
