//! Input synchronization
//!
//! Binds a coarse range control and a precise numeric control to one logical
//! value per parameter and derives the validity styling of the precise
//! control.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::catalog::{self, Parameter};
use crate::models::{ControlSource, ReadingSet};
use crate::validation::parse_control_value;

/// Advisory styling of a control. Never blocks submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Nominal,
    OutOfIdealRange,
}

/// Current state of the two controls bound to one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlState {
    pub param_id: &'static str,
    /// Range control value, always inside the parameter's full range
    pub coarse: f64,
    /// Numeric entry value
    pub precise: f64,
    pub validity: Validity,
    /// Set when a submission was rejected because this value was missing
    pub missing: bool,
}

impl ControlState {
    fn new(param: &Parameter) -> Self {
        let start = param.midpoint();
        Self {
            param_id: param.id,
            coarse: start,
            precise: start,
            validity: validity_for(param, start),
            missing: false,
        }
    }
}

/// Result of dispatching an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Raw input was not numeric; nothing changed
    Ignored,
    UnknownParameter,
}

pub fn validity_for(param: &Parameter, value: f64) -> Validity {
    if param.is_ideal(value) {
        Validity::Nominal
    } else {
        Validity::OutOfIdealRange
    }
}

/// Keeps both controls of every catalog parameter converged.
#[derive(Debug, Clone)]
pub struct InputSyncController {
    controls: BTreeMap<&'static str, ControlState>,
}

impl InputSyncController {
    pub fn new() -> Self {
        let controls = catalog::parameters()
            .iter()
            .map(|p| (p.id, ControlState::new(p)))
            .collect();
        Self { controls }
    }

    /// Route an edit from either control
    pub fn on_edit(&mut self, param_id: &str, raw_value: &str, source: ControlSource) -> EditOutcome {
        match source {
            ControlSource::Coarse => self.on_coarse_change(param_id, raw_value),
            ControlSource::Precise => self.on_precise_change(param_id, raw_value),
        }
    }

    pub fn on_coarse_change(&mut self, param_id: &str, raw_value: &str) -> EditOutcome {
        self.apply_edit(param_id, raw_value, |param, value| param.clamp_to_range(value))
    }

    pub fn on_precise_change(&mut self, param_id: &str, raw_value: &str) -> EditOutcome {
        self.apply_edit(param_id, raw_value, |_, value| value)
    }

    fn apply_edit(
        &mut self,
        param_id: &str,
        raw_value: &str,
        accept: impl Fn(&Parameter, f64) -> f64,
    ) -> EditOutcome {
        let Some(param) = catalog::find(param_id) else {
            return EditOutcome::UnknownParameter;
        };
        let Some(value) = parse_control_value(raw_value) else {
            debug!(param_id = %param_id, raw = %raw_value, "Ignoring non-numeric control input");
            return EditOutcome::Ignored;
        };

        self.set_value(param, accept(param, value));
        EditOutcome::Applied
    }

    /// Write externally fetched values into both controls. Parameters absent
    /// from `data` keep their current value.
    pub fn apply_external(&mut self, data: &ReadingSet) -> usize {
        let mut applied = 0;
        for param in catalog::parameters() {
            if let Some(value) = data.get(param.id).filter(|v| v.is_finite()) {
                self.set_value(param, value);
                applied += 1;
            }
        }
        applied
    }

    // The range control cannot hold a value outside [min, max]; the numeric
    // control keeps what was entered.
    fn set_value(&mut self, param: &Parameter, value: f64) {
        if let Some(control) = self.controls.get_mut(param.id) {
            control.precise = value;
            control.coarse = param.clamp_to_range(value);
            control.validity = validity_for(param, value);
            control.missing = false;
        }
    }

    /// Flag the precise controls of the given parameters as missing input
    pub fn mark_missing(&mut self, param_ids: &[String]) {
        for id in param_ids {
            if let Some(control) = self.controls.get_mut(id.as_str()) {
                control.missing = true;
            }
        }
    }

    pub fn clear_missing(&mut self) {
        for control in self.controls.values_mut() {
            control.missing = false;
        }
    }

    pub fn control(&self, param_id: &str) -> Option<&ControlState> {
        self.controls.get(param_id)
    }

    /// Control states in catalog order
    pub fn controls(&self) -> Vec<ControlState> {
        catalog::parameters()
            .iter()
            .filter_map(|p| self.controls.get(p.id).cloned())
            .collect()
    }

    /// Reading set gathered from the precise controls
    pub fn reading_set(&self) -> ReadingSet {
        self.controls
            .values()
            .map(|c| (c.param_id.to_string(), c.precise))
            .collect()
    }
}

impl Default for InputSyncController {
    fn default() -> Self {
        Self::new()
    }
}
