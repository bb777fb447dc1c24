//! Report assembly and plain-text export
//!
//! A report is a snapshot of the current score, assessment, per-parameter
//! values and recommendations. It is built on demand and not retained.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt::Write as _;

use crate::catalog;
use crate::models::{ReadingSet, Tier};

pub const NOT_AVAILABLE: &str = "not available";

pub const REPORT_TITLE: &str = "PureCast | Water Quality Report";

/// Resolved value of one parameter in a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportValue {
    Available(f64),
    NotAvailable,
}

impl Serialize for ReportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportValue::Available(v) => serializer.serialize_f64(*v),
            ReportValue::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub param_id: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub value: ReportValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
    pub generated_at: DateTime<Utc>,
    pub wqi: f64,
    pub tier: Tier,
    pub assessment: String,
    pub parameters: Vec<ReportLine>,
    pub recommendations: Vec<String>,
}

/// Collect the report contents.
///
/// Each parameter resolves to the live reading, else the last externally
/// fetched value, else [`ReportValue::NotAvailable`].
pub fn assemble(
    current_score: f64,
    current_assessment: &str,
    readings: &ReadingSet,
    fallback_external: Option<&ReadingSet>,
    recommendations: &[String],
) -> ReportSnapshot {
    let parameters = catalog::parameters()
        .iter()
        .map(|p| {
            let value = readings
                .get(p.id)
                .or_else(|| fallback_external.and_then(|data| data.get(p.id)))
                .filter(|v| v.is_finite())
                .map_or(ReportValue::NotAvailable, ReportValue::Available);

            ReportLine {
                param_id: p.id,
                label: p.label,
                unit: p.unit,
                value,
            }
        })
        .collect();

    ReportSnapshot {
        generated_at: Utc::now(),
        wqi: current_score,
        tier: Tier::from_wqi(current_score),
        assessment: current_assessment.to_string(),
        parameters,
        recommendations: recommendations.to_vec(),
    }
}

/// Render a snapshot as a plain-text document
pub fn render_text(snapshot: &ReportSnapshot, location: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", REPORT_TITLE);
    let _ = writeln!(out, "Generated: {}", snapshot.generated_at.to_rfc2822());
    let _ = writeln!(out, "Location: {}", location);
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(out);

    let _ = writeln!(out, "Analysis Results");
    let _ = writeln!(out, "Overall WQI Score: {:.0}/100", snapshot.wqi);
    let _ = writeln!(out, "Assessment: {}", snapshot.assessment);
    let _ = writeln!(out);

    let _ = writeln!(out, "Parameter Readings:");
    for line in &snapshot.parameters {
        match line.value {
            ReportValue::Available(v) => {
                let _ = writeln!(out, "  {}: {:.2} {}", line.label, v, line.unit);
            }
            ReportValue::NotAvailable => {
                let _ = writeln!(out, "  {}: {}", line.label, NOT_AVAILABLE);
            }
        }
    }

    if !snapshot.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recommendations:");
        for rec in &snapshot.recommendations {
            let _ = writeln!(out, "  • {}", rec);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(snapshot: &ReportSnapshot, id: &str) -> ReportValue {
        snapshot
            .parameters
            .iter()
            .find(|l| l.param_id == id)
            .map(|l| l.value)
            .unwrap()
    }

    #[test]
    fn test_live_value_wins_over_fallback() {
        let mut live = ReadingSet::new();
        live.insert("ph", 7.1);
        let mut fetched = ReadingSet::new();
        fetched.insert("ph", 7.9);

        let snapshot = assemble(82.0, "Good Quality", &live, Some(&fetched), &[]);
        assert_eq!(value_of(&snapshot, "ph"), ReportValue::Available(7.1));
    }

    #[test]
    fn test_fallback_then_not_available() {
        let live = ReadingSet::new();
        let mut fetched = ReadingSet::new();
        fetched.insert("turbidity", 3.4);

        let snapshot = assemble(60.0, "Fair", &live, Some(&fetched), &[]);
        assert_eq!(value_of(&snapshot, "turbidity"), ReportValue::Available(3.4));
        assert_eq!(value_of(&snapshot, "nitrate"), ReportValue::NotAvailable);
        assert_eq!(snapshot.parameters.len(), catalog::parameters().len());
        assert_eq!(snapshot.tier, Tier::Moderate);
    }

    #[test]
    fn test_not_available_serializes_as_literal() {
        let snapshot = assemble(50.0, "x", &ReadingSet::new(), None, &[]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["parameters"][0]["value"], NOT_AVAILABLE);
    }

    #[test]
    fn test_render_text_sections() {
        let mut live = ReadingSet::new();
        live.insert("ph", 9.0);
        let recs = vec!["Neutralize acidity immediately.".to_string()];
        let snapshot = assemble(47.0, "Poor Quality", &live, None, &recs);

        let text = render_text(&snapshot, "Station A1");
        assert!(text.starts_with(REPORT_TITLE));
        assert!(text.contains("Location: Station A1"));
        assert!(text.contains("Overall WQI Score: 47/100"));
        assert!(text.contains("pH Level: 9.00 pH"));
        assert!(text.contains("Nitrate: not available"));
        assert!(text.contains("• Neutralize acidity immediately."));
    }

    #[test]
    fn test_render_text_omits_empty_recommendations() {
        let snapshot = assemble(92.0, "Excellent", &ReadingSet::new(), None, &[]);
        assert!(!render_text(&snapshot, "x").contains("Recommendations:"));
    }
}
