//! Data models for readings, scores and dashboard messages
//!
//! Defines the core data structures used throughout the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::catalog;
use crate::render::DashboardView;

/// Mapping from parameter identifier to its current numeric value.
///
/// Serialized as a flat JSON object, which is also the request body of the
/// scoring service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingSet(BTreeMap<String, f64>);

impl ReadingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: f64) {
        self.0.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Catalog parameters that have no finite entry, in catalog order.
    pub fn missing_parameters(&self) -> Vec<String> {
        catalog::parameters()
            .iter()
            .filter(|p| !self.get(p.id).is_some_and(f64::is_finite))
            .map(|p| p.id.to_string())
            .collect()
    }
}

impl FromIterator<(String, f64)> for ReadingSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Qualitative severity bucket derived from the WQI, for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Moderate,
    Critical,
}

impl Tier {
    pub fn from_wqi(wqi: f64) -> Self {
        if wqi >= 90.0 {
            Tier::Excellent
        } else if wqi >= 75.0 {
            Tier::Good
        } else if wqi >= 55.0 {
            Tier::Moderate
        } else {
            Tier::Critical
        }
    }

    /// Assessment text used when the scoring service omits one.
    pub fn default_assessment(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent Quality",
            Tier::Good => "Good Quality",
            Tier::Moderate => "Moderate Quality",
            Tier::Critical => "Critical Quality",
        }
    }
}

/// Normalized result of a scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Water quality index, always within [0, 100]
    pub wqi: f64,
    pub assessment: String,
}

impl ScoreResult {
    pub fn tier(&self) -> Tier {
        Tier::from_wqi(self.wqi)
    }
}

/// One point of the rolling score chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub label: String,
    pub wqi: f64,
}

/// Severity of an operational notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Operational notice shown in the alert log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(message: impl Into<String>, severity: AlertSeverity) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            timestamp: Utc::now(),
        }
    }
}

/// Which of the two bound controls an edit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlSource {
    /// Continuous range control
    Coarse,
    /// Numeric entry control
    Precise,
}

/// Input DTO for a control edit
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditInput {
    #[validate(length(max = 64, message = "Raw value must be at most 64 characters"))]
    pub raw_value: String,

    pub source: ControlSource,
}

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    /// Dashboard view changed
    DashboardUpdate(DashboardView),
    /// Connection acknowledgment
    Connected { client_id: String },
    /// Error message
    Error { message: String },
    /// Heartbeat/ping
    Ping,
    /// Heartbeat/pong response
    Pong,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub connected_clients: usize,
    pub last_prediction: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_set() -> ReadingSet {
        catalog::parameters()
            .iter()
            .map(|p| (p.id.to_string(), p.midpoint()))
            .collect()
    }

    #[test]
    fn test_tier_mapping() {
        assert_eq!(Tier::from_wqi(95.0), Tier::Excellent);
        assert_eq!(Tier::from_wqi(90.0), Tier::Excellent);
        assert_eq!(Tier::from_wqi(80.0), Tier::Good);
        assert_eq!(Tier::from_wqi(60.0), Tier::Moderate);
        assert_eq!(Tier::from_wqi(55.0), Tier::Moderate);
        assert_eq!(Tier::from_wqi(40.0), Tier::Critical);
    }

    #[test]
    fn test_complete_reading_set() {
        let set = complete_set();
        assert!(set.missing_parameters().is_empty());
    }

    #[test]
    fn test_missing_parameters_in_catalog_order() {
        let mut set = complete_set();
        set.0.remove("nitrate");
        set.0.remove("ph");
        set.insert("tds", f64::NAN);

        assert_eq!(set.missing_parameters(), vec!["ph", "tds", "nitrate"]);
    }

    #[test]
    fn test_reading_set_serializes_flat() {
        let mut set = ReadingSet::new();
        set.insert("ph", 7.5);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!({ "ph": 7.5 }));
    }

    #[test]
    fn test_control_source_wire_format() {
        let input: EditInput =
            serde_json::from_str(r#"{"raw_value":"7.2","source":"precise"}"#).unwrap();
        assert_eq!(input.source, ControlSource::Precise);
    }
}
