//! View State
//!
//! Folds the two per-query results into one of three view states.

use std::sync::Arc;

use super::model::{ChartModel, ViewModelBuilder};
use crate::data::AccidentDataByMonth;

/// Result slot of a single query
#[derive(Debug)]
pub enum QueryState<T> {
    Pending,
    /// Settled with an error; the message is kept for logging only
    Failed(String),
    Settled(Arc<T>),
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Failed(e) => QueryState::Failed(e.clone()),
            QueryState::Settled(v) => QueryState::Settled(Arc::clone(v)),
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryState::Failed(_))
    }
}

/// What the chart shows
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error,
    Ready(Arc<ChartModel>),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error)
    }

    pub fn model(&self) -> Option<&ChartModel> {
        match self {
            ViewState::Ready(model) => Some(model),
            _ => None,
        }
    }
}

impl ViewModelBuilder {
    /// Derive the view state from both query slots
    ///
    /// A pending query keeps the view loading even if the other one already
    /// failed. Once both have settled, any failure yields `Error`.
    pub fn reduce(
        &mut self,
        accidents: &QueryState<AccidentDataByMonth>,
        deaths: &QueryState<AccidentDataByMonth>,
    ) -> ViewState {
        if accidents.is_pending() || deaths.is_pending() {
            return ViewState::Loading;
        }
        match (accidents, deaths) {
            (QueryState::Settled(a), QueryState::Settled(d)) => ViewState::Ready(self.build(a, d)),
            _ => ViewState::Error,
        }
    }
}
