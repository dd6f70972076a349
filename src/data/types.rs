//! Monthly Aggregate Types
//!
//! JSON shapes returned by `GET /api/accidents_by_month`.

use serde::{Deserialize, Serialize};

/// Accident count for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAccidentRecord {
    /// Month label, e.g. "2023-01"
    pub year_month: String,
    pub total_accidents: i64,
}

impl MonthlyAccidentRecord {
    pub fn new(year_month: impl Into<String>, total_accidents: i64) -> Self {
        Self {
            year_month: year_month.into(),
            total_accidents,
        }
    }
}

/// Death count for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDeathRecord {
    /// Month label, e.g. "2023-01"
    pub year_month: String,
    pub total_deaths: i64,
}

impl MonthlyDeathRecord {
    pub fn new(year_month: impl Into<String>, total_deaths: i64) -> Self {
        Self {
            year_month: year_month.into(),
            total_deaths,
        }
    }
}

/// Combined payload carrying both monthly series
///
/// The two lists are expected to share the same month ordering, but nothing
/// downstream relies on them having the same length. A missing list decodes
/// as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentDataByMonth {
    #[serde(default)]
    pub accidents: Vec<MonthlyAccidentRecord>,
    #[serde(default)]
    pub deaths: Vec<MonthlyDeathRecord>,
}

impl AccidentDataByMonth {
    pub fn new(accidents: Vec<MonthlyAccidentRecord>, deaths: Vec<MonthlyDeathRecord>) -> Self {
        Self { accidents, deaths }
    }

    /// Accident totals in payload order
    pub fn accident_totals(&self) -> Vec<f64> {
        self.accidents
            .iter()
            .map(|r| r.total_accidents as f64)
            .collect()
    }

    /// Death totals in payload order
    pub fn death_totals(&self) -> Vec<f64> {
        self.deaths.iter().map(|r| r.total_deaths as f64).collect()
    }

    /// Month labels of the accidents list
    pub fn months(&self) -> Vec<String> {
        self.accidents.iter().map(|r| r.year_month.clone()).collect()
    }

    /// Whether the death list lines up month-for-month with the accident list
    pub fn is_aligned(&self) -> bool {
        self.accidents.len() == self.deaths.len()
            && self
                .accidents
                .iter()
                .zip(&self.deaths)
                .all(|(a, d)| a.year_month == d.year_month)
    }

    pub fn is_empty(&self) -> bool {
        self.accidents.is_empty() && self.deaths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let json = r#"{
            "accidents": [
                {"year_month": "2023-01", "total_accidents": 10},
                {"year_month": "2023-02", "total_accidents": 12}
            ],
            "deaths": [
                {"year_month": "2023-01", "total_deaths": 2},
                {"year_month": "2023-02", "total_deaths": 1}
            ]
        }"#;

        let data: AccidentDataByMonth = serde_json::from_str(json).unwrap();
        assert_eq!(data.accidents.len(), 2);
        assert_eq!(data.deaths[1], MonthlyDeathRecord::new("2023-02", 1));
        assert_eq!(data.accident_totals(), vec![10.0, 12.0]);
        assert_eq!(data.months(), vec!["2023-01", "2023-02"]);
        assert!(data.is_aligned());
    }

    #[test]
    fn test_missing_lists_decode_empty() {
        let data: AccidentDataByMonth = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());

        let data: AccidentDataByMonth =
            serde_json::from_str(r#"{"accidents": [{"year_month": "2023-01", "total_accidents": 3}]}"#)
                .unwrap();
        assert_eq!(data.accidents.len(), 1);
        assert!(data.deaths.is_empty());
        assert!(!data.is_aligned());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let result: Result<AccidentDataByMonth, _> =
            serde_json::from_str(r#"{"accidents": "not a list"}"#);
        assert!(result.is_err());
    }
}
