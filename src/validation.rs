//! Input validation module
//!
//! Numeric parsing of control input, the reading-set completeness gate and
//! the startup check of the parameter catalog.

use crate::catalog::Parameter;
use crate::error::{AppError, AppResult, PredictError};
use crate::models::{EditInput, ReadingSet};
use tracing::{debug, warn};
use validator::Validate;

/// Validate a control edit request body
pub fn validate_edit_input(input: &EditInput) -> AppResult<()> {
    if let Err(validation_errors) = input.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let msgs: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|c| c.as_ref()))
                    .collect();
                format!("{}: {}", field, msgs.join(", "))
            })
            .collect();

        warn!(errors = ?error_messages, "Edit input validation failed");
        return Err(AppError::ValidationError(error_messages.join("; ")));
    }

    Ok(())
}

/// Parse raw control text into a finite number.
///
/// Returns `None` for anything that is not a finite decimal, including the
/// `NaN`/`inf` spellings `f64::from_str` would otherwise accept.
pub fn parse_control_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reject a reading set that lacks a finite value for any catalog parameter
pub fn ensure_complete(readings: &ReadingSet) -> Result<(), PredictError> {
    let missing = readings.missing_parameters();
    if missing.is_empty() {
        debug!("Reading set completeness check passed");
        Ok(())
    } else {
        Err(PredictError::Validation { missing })
    }
}

/// Check the range invariant `min <= idealMin <= idealMax <= max` for every
/// definition, reporting all violations at once.
pub fn validate_catalog(parameters: &[Parameter]) -> AppResult<()> {
    let mut violations = Vec::new();

    for p in parameters {
        if !(p.min <= p.max) {
            violations.push(format!("{}: min {} exceeds max {}", p.id, p.min, p.max));
        }
        if let Some(lo) = p.ideal_min {
            if lo < p.min || lo > p.max {
                violations.push(format!(
                    "{}: ideal min {} outside range [{}, {}]",
                    p.id, lo, p.min, p.max
                ));
            }
        }
        if let Some(hi) = p.ideal_max {
            if hi < p.min || hi > p.max {
                violations.push(format!(
                    "{}: ideal max {} outside range [{}, {}]",
                    p.id, hi, p.min, p.max
                ));
            }
        }
        if let (Some(lo), Some(hi)) = (p.ideal_min, p.ideal_max) {
            if lo > hi {
                violations.push(format!("{}: ideal min {} exceeds ideal max {}", p.id, lo, hi));
            }
        }
        if !(p.step > 0.0) {
            violations.push(format!("{}: step must be positive", p.id));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        warn!(violations = ?violations, "Parameter catalog failed validation");
        Err(AppError::ValidationError(violations.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::models::ControlSource;

    #[test]
    fn test_parse_control_value() {
        assert_eq!(parse_control_value("7.25"), Some(7.25));
        assert_eq!(parse_control_value("  12 "), Some(12.0));
        assert_eq!(parse_control_value("-0.5"), Some(-0.5));
        assert_eq!(parse_control_value(""), None);
        assert_eq!(parse_control_value("abc"), None);
        assert_eq!(parse_control_value("NaN"), None);
        assert_eq!(parse_control_value("inf"), None);
    }

    #[test]
    fn test_ensure_complete_rejects_missing() {
        let mut readings = ReadingSet::new();
        readings.insert("ph", 7.0);

        match ensure_complete(&readings) {
            Err(PredictError::Validation { missing }) => {
                assert_eq!(missing.len(), catalog::parameters().len() - 1);
                assert!(!missing.contains(&"ph".to_string()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ensure_complete_accepts_full_set() {
        let readings: ReadingSet = catalog::parameters()
            .iter()
            .map(|p| (p.id.to_string(), p.midpoint()))
            .collect();
        assert!(ensure_complete(&readings).is_ok());
    }

    #[test]
    fn test_catalog_violation_detected() {
        let broken = Parameter {
            ideal_min: Some(9.0),
            ideal_max: Some(8.0),
            ..*catalog::find("ph").unwrap()
        };
        let out_of_range = Parameter {
            ideal_max: Some(150.0),
            ..*catalog::find("turbidity").unwrap()
        };

        let result = validate_catalog(&[broken, out_of_range]);
        match result {
            Err(AppError::ValidationError(msg)) => {
                assert!(msg.contains("ph: ideal min 9 exceeds ideal max 8"));
                assert!(msg.contains("turbidity: ideal max 150"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_edit_input_length_limit() {
        let ok = EditInput {
            raw_value: "7.0".to_string(),
            source: ControlSource::Coarse,
        };
        assert!(validate_edit_input(&ok).is_ok());

        let too_long = EditInput {
            raw_value: "9".repeat(100),
            source: ControlSource::Coarse,
        };
        assert!(validate_edit_input(&too_long).is_err());
    }
}
