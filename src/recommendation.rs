//! Rule-based remediation advice
//!
//! Compares each reading against its parameter's ideal range and returns
//! human-readable recommendations. Stateless: identical inputs always give
//! identical output.

use crate::catalog::{self, Parameter};
use crate::models::ReadingSet;

/// Scores below this add the global critical-condition entry
pub const CRITICAL_WQI: f64 = 50.0;

pub const CRITICAL_MESSAGE: &str = "WQI is critical. Immediate water treatment recommended.";

/// Evaluate every catalog parameter, in catalog order, followed by the
/// global critical entry when `wqi` is below [`CRITICAL_WQI`].
pub fn evaluate(readings: &ReadingSet, wqi: f64) -> Vec<String> {
    evaluate_with(catalog::parameters(), readings, wqi)
}

pub fn evaluate_with(parameters: &[Parameter], readings: &ReadingSet, wqi: f64) -> Vec<String> {
    let mut entries = Vec::new();

    for param in parameters {
        let Some(value) = readings.get(param.id) else {
            continue;
        };

        if param.ideal_max.is_some_and(|hi| value > hi) {
            entries.push(high_message(param));
        }
        if param.ideal_min.is_some_and(|lo| value < lo) {
            entries.push(low_message(param));
        }
    }

    if wqi < CRITICAL_WQI {
        entries.push(CRITICAL_MESSAGE.to_string());
    }

    entries
}

fn high_message(param: &Parameter) -> String {
    param
        .msg_high
        .map(str::to_string)
        .unwrap_or_else(|| format!("High {} detected. Investigate source.", param.label))
}

fn low_message(param: &Parameter) -> String {
    param
        .msg_low
        .map(str::to_string)
        .unwrap_or_else(|| format!("Low {} detected.", param.label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn nominal_readings() -> ReadingSet {
        let mut readings = ReadingSet::new();
        readings.insert("ph", 7.2);
        readings.insert("turbidity", 2.0);
        readings.insert("tds", 300.0);
        readings.insert("do", 8.0);
        readings.insert("temp", 22.0);
        readings.insert("conductivity", 600.0);
        readings.insert("chlorine", 0.5);
        readings.insert("nitrate", 4.0);
        readings
    }

    #[test]
    fn test_nominal_readings_yield_nothing() {
        assert!(evaluate(&nominal_readings(), 85.0).is_empty());
    }

    #[test]
    fn test_high_ph_single_entry() {
        let mut readings = ReadingSet::new();
        readings.insert("ph", 9.0);
        readings.insert("turbidity", 2.0);

        let recs = evaluate(&readings, 80.0);
        assert_eq!(recs, vec!["Neutralize acidity immediately.".to_string()]);
    }

    #[test]
    fn test_critical_wqi_appends_global_entry() {
        let recs = evaluate(&nominal_readings(), 40.0);
        assert_eq!(Tier::from_wqi(40.0), Tier::Critical);
        assert_eq!(recs, vec![CRITICAL_MESSAGE.to_string()]);
    }

    #[test]
    fn test_catalog_order_then_global() {
        let mut readings = nominal_readings();
        readings.insert("nitrate", 25.0);
        readings.insert("ph", 5.0);
        readings.insert("do", 3.0);

        let recs = evaluate(&readings, 30.0);
        assert_eq!(
            recs,
            vec![
                "Increase alkalinity.".to_string(),
                "Critical oxygen depletion. Aeration needed.".to_string(),
                "Runoff pollution. Denitrification needed.".to_string(),
                CRITICAL_MESSAGE.to_string(),
            ]
        );
    }

    #[test]
    fn test_generic_fallback_messages() {
        let mut readings = nominal_readings();
        readings.insert("turbidity", -1.0);
        readings.insert("do", 25.0);

        let recs = evaluate(&readings, 70.0);
        assert_eq!(
            recs,
            vec![
                "Low Turbidity detected.".to_string(),
                "High Dissolved Oxygen detected. Investigate source.".to_string(),
            ]
        );
    }

    #[test]
    fn test_absent_bound_never_fires() {
        let open = Parameter {
            ideal_max: None,
            ..*catalog::find("tds").unwrap()
        };
        let mut readings = ReadingSet::new();
        readings.insert("tds", 1900.0);
        assert!(evaluate_with(&[open], &readings, 90.0).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let mut readings = nominal_readings();
        readings.insert("chlorine", 0.1);
        let first = evaluate(&readings, 45.0);
        for _ in 0..5 {
            assert_eq!(evaluate(&readings, 45.0), first);
        }
    }
}
