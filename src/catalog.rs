//! Parameter catalog
//!
//! Fixed, ordered definitions of every measured water-quality parameter
//! together with its full range, ideal range and advisory messages.

use serde::Serialize;

/// A single measured parameter.
///
/// Ideal bounds are optional; an absent bound means the ideal range is
/// unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Parameter {
    pub id: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub ideal_min: Option<f64>,
    pub ideal_max: Option<f64>,
    pub step: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_high: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_low: Option<&'static str>,
}

impl Parameter {
    /// Midpoint of the full range, used for control initialisation and for
    /// live data that omits the parameter.
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Whether `value` lies inside the ideal range (absent bounds are open).
    pub fn is_ideal(&self, value: f64) -> bool {
        let above_min = self.ideal_min.map_or(true, |lo| value >= lo);
        let below_max = self.ideal_max.map_or(true, |hi| value <= hi);
        above_min && below_max
    }

    pub fn clamp_to_range(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

static PARAMETERS: [Parameter; 8] = [
    Parameter {
        id: "ph",
        label: "pH Level",
        unit: "pH",
        min: 0.0,
        max: 14.0,
        ideal_min: Some(6.5),
        ideal_max: Some(8.5),
        step: 0.1,
        msg_high: Some("Neutralize acidity immediately."),
        msg_low: Some("Increase alkalinity."),
    },
    Parameter {
        id: "turbidity",
        label: "Turbidity",
        unit: "NTU",
        min: 0.0,
        max: 100.0,
        ideal_min: Some(0.0),
        ideal_max: Some(5.0),
        step: 0.1,
        msg_high: Some("High suspension. Filtration required."),
        msg_low: None,
    },
    Parameter {
        id: "tds",
        label: "TDS",
        unit: "mg/L",
        min: 0.0,
        max: 2000.0,
        ideal_min: Some(0.0),
        ideal_max: Some(500.0),
        step: 1.0,
        msg_high: Some("High dissolved solids. Reverse Osmosis recommended."),
        msg_low: None,
    },
    Parameter {
        id: "do",
        label: "Dissolved Oxygen",
        unit: "mg/L",
        min: 0.0,
        max: 20.0,
        ideal_min: Some(6.5),
        ideal_max: Some(20.0),
        step: 0.1,
        msg_high: None,
        msg_low: Some("Critical oxygen depletion. Aeration needed."),
    },
    Parameter {
        id: "temp",
        label: "Temperature",
        unit: "°C",
        min: 0.0,
        max: 50.0,
        ideal_min: Some(10.0),
        ideal_max: Some(30.0),
        step: 0.1,
        msg_high: Some("Temperature too high for aquatic balance."),
        msg_low: Some("Temperature too low."),
    },
    Parameter {
        id: "conductivity",
        label: "Conductivity",
        unit: "µS/cm",
        min: 0.0,
        max: 2000.0,
        ideal_min: Some(0.0),
        ideal_max: Some(1000.0),
        step: 1.0,
        msg_high: Some("High ionic content detected."),
        msg_low: None,
    },
    Parameter {
        id: "chlorine",
        label: "Chlorine",
        unit: "mg/L",
        min: 0.0,
        max: 10.0,
        ideal_min: Some(0.2),
        ideal_max: Some(1.0),
        step: 0.01,
        msg_high: Some("Dechlorination required."),
        msg_low: Some("Disinfection risk."),
    },
    Parameter {
        id: "nitrate",
        label: "Nitrate",
        unit: "mg/L",
        min: 0.0,
        max: 100.0,
        ideal_min: Some(0.0),
        ideal_max: Some(10.0),
        step: 0.1,
        msg_high: Some("Runoff pollution. Denitrification needed."),
        msg_low: None,
    },
];

/// The fixed ordered parameter list.
pub fn parameters() -> &'static [Parameter] {
    &PARAMETERS
}

/// Look up a parameter by identifier.
pub fn find(id: &str) -> Option<&'static Parameter> {
    PARAMETERS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_catalog;

    #[test]
    fn test_catalog_order() {
        let ids: Vec<&str> = parameters().iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec!["ph", "turbidity", "tds", "do", "temp", "conductivity", "chlorine", "nitrate"]
        );
    }

    #[test]
    fn test_catalog_passes_range_invariant() {
        assert!(validate_catalog(parameters()).is_ok());
    }

    #[test]
    fn test_find_parameter() {
        let ph = find("ph").unwrap();
        assert_eq!(ph.label, "pH Level");
        assert_eq!(ph.midpoint(), 7.0);
        assert!(find("lead").is_none());
    }

    #[test]
    fn test_ideal_range_bounds() {
        let ph = find("ph").unwrap();
        assert!(ph.is_ideal(6.5));
        assert!(ph.is_ideal(8.5));
        assert!(!ph.is_ideal(9.0));
        assert!(!ph.is_ideal(6.4));
    }

    #[test]
    fn test_open_ideal_bound() {
        let open = Parameter {
            ideal_max: None,
            ..*find("do").unwrap()
        };
        assert!(open.is_ideal(1_000.0));
        assert!(!open.is_ideal(2.0));
    }
}
