//! Payload Types
//!
//! Monthly accident and death aggregates as served by the statistics API.

mod types;

pub use types::{AccidentDataByMonth, MonthlyAccidentRecord, MonthlyDeathRecord};
