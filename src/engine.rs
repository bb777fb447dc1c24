//! Quality assessment engine
//!
//! Owns the session state (controls, score, history, recommendations, alert
//! log) and drives it through prediction and live-data cycles. Network calls
//! happen outside the engine: a cycle is split into `begin_*`, which runs
//! before the request is sent, and `resolve_*`/`complete_*`, which applies
//! the response.
//!
//! Every issued prediction gets a sequence number. A response is applied
//! only when its number is the latest issued, so a slow earlier request can
//! never overwrite the result of a later one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::alerts::AlertLog;
use crate::catalog;
use crate::error::PredictError;
use crate::history::HistoryBuffer;
use crate::models::{Alert, AlertSeverity, ControlSource, HistoryPoint, ReadingSet, ScoreResult, Tier};
use crate::prediction::with_midpoint_defaults;
use crate::recommendation;
use crate::render::RenderPort;
use crate::report::{self, ReportSnapshot};
use crate::sync::{ControlState, EditOutcome, InputSyncController};
use crate::validation::ensure_complete;

/// Where the readings of a prediction come from
#[derive(Debug, Clone)]
pub enum ReadingSource {
    /// Current precise control values
    Controls,
    /// A set supplied with the request. The controls are left untouched.
    Explicit(ReadingSet),
}

/// An issued prediction request
#[derive(Debug, Clone)]
pub struct PredictionTicket {
    pub seq: u64,
    pub readings: ReadingSet,
}

/// What a resolved prediction did to the displayed state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub seq: u64,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wqi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,
    pub recommendations: Vec<String>,
}

impl PredictionSummary {
    fn superseded(seq: u64) -> Self {
        Self {
            seq,
            applied: false,
            wqi: None,
            tier: None,
            assessment: None,
            recommendations: Vec::new(),
        }
    }
}

pub struct EngineContext<R: RenderPort> {
    sync: InputSyncController,
    history: HistoryBuffer,
    alerts: AlertLog,
    recommendations: Vec<String>,
    current: Option<ScoreResult>,
    // readings behind `current`
    last_scored: Option<ReadingSet>,
    last_fetched: Option<ReadingSet>,
    last_prediction_at: Option<DateTime<Utc>>,
    latest_seq: u64,
    in_flight: usize,
    port: R,
}

impl<R: RenderPort> EngineContext<R> {
    pub fn new(port: R) -> Self {
        Self {
            sync: InputSyncController::new(),
            history: HistoryBuffer::new(),
            alerts: AlertLog::new(),
            recommendations: Vec::new(),
            current: None,
            last_scored: None,
            last_fetched: None,
            last_prediction_at: None,
            latest_seq: 0,
            in_flight: 0,
            port,
        }
    }

    /// Dispatch an edit from either control of a parameter
    pub fn on_edit(&mut self, param_id: &str, raw_value: &str, source: ControlSource) -> EditOutcome {
        self.sync.on_edit(param_id, raw_value, source)
    }

    /// Current reading set taken from the controls
    pub fn reading_set(&self) -> ReadingSet {
        self.sync.reading_set()
    }

    /// Validate the readings from `source` and issue a new request sequence
    /// number.
    ///
    /// An incomplete set is rejected with one warning alert and no ticket is
    /// issued. Missing controls are flagged only when the set came from the
    /// controls.
    pub fn begin_prediction(&mut self, source: ReadingSource) -> Result<PredictionTicket, PredictError> {
        let (readings, from_controls) = match source {
            ReadingSource::Controls => (self.reading_set(), true),
            ReadingSource::Explicit(readings) => (readings, false),
        };

        if let Err(err) = ensure_complete(&readings) {
            if let PredictError::Validation { missing } = &err {
                if from_controls {
                    self.sync.mark_missing(missing);
                }
                let labels: Vec<&str> = missing
                    .iter()
                    .map(|id| catalog::find(id).map_or(id.as_str(), |p| p.label))
                    .collect();
                self.notify(format!("Missing input for {}", labels.join(", ")), AlertSeverity::Warning);
            }
            return Err(err);
        }

        if from_controls {
            self.sync.clear_missing();
        }
        self.latest_seq += 1;
        self.in_flight += 1;
        self.port.show_working(true);

        debug!(
            seq = self.latest_seq,
            in_flight = self.in_flight,
            from_controls,
            "Prediction issued"
        );

        Ok(PredictionTicket {
            seq: self.latest_seq,
            readings,
        })
    }

    /// Apply the outcome of an issued prediction.
    ///
    /// Failures leave score, history and recommendations untouched and add
    /// one alert. A success from a superseded ticket is dropped.
    pub fn resolve_prediction(
        &mut self,
        ticket: PredictionTicket,
        result: Result<ScoreResult, PredictError>,
    ) -> Result<PredictionSummary, PredictError> {
        self.finish_request();

        let score = match result {
            Ok(score) => score,
            Err(err) => {
                let severity = match err {
                    PredictError::Validation { .. } => AlertSeverity::Warning,
                    PredictError::Service(_) => AlertSeverity::Error,
                };
                self.notify(format!("API Error: {}", err), severity);
                return Err(err);
            }
        };

        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "Dropping superseded prediction result"
            );
            return Ok(PredictionSummary::superseded(ticket.seq));
        }

        let previous = self.current.as_ref().map(|s| s.wqi);
        let tier = score.tier();

        self.history.append(Utc::now().format("%H:%M:%S").to_string(), score.wqi);
        self.recommendations = recommendation::evaluate(&ticket.readings, score.wqi);
        self.last_prediction_at = Some(Utc::now());

        self.port.show_score(previous, score.wqi);
        self.port.show_assessment(tier, &score.assessment);
        self.port.show_history(&self.history.snapshot());
        self.port.show_recommendations(&self.recommendations);

        info!(
            seq = ticket.seq,
            wqi = score.wqi,
            tier = ?tier,
            recommendations = self.recommendations.len(),
            "Prediction applied"
        );
        self.notify(format!("Analysis Complete. WQI: {:.0}", score.wqi), AlertSeverity::Success);

        let summary = PredictionSummary {
            seq: ticket.seq,
            applied: true,
            wqi: Some(score.wqi),
            tier: Some(tier),
            assessment: Some(score.assessment.clone()),
            recommendations: self.recommendations.clone(),
        };
        self.current = Some(score);
        self.last_scored = Some(ticket.readings);
        Ok(summary)
    }

    /// Mark a live-data fetch as outstanding
    pub fn begin_live_sync(&mut self) {
        self.in_flight += 1;
        self.port.show_working(true);
        self.notify("Contacting live data source...", AlertSeverity::Info);
    }

    /// Apply fetched live data to the controls and keep it as the report
    /// fallback. Parameters the source omitted are set to the midpoint of
    /// their range. Returns the number of parameters the source supplied.
    pub fn complete_live_sync(&mut self, result: Result<ReadingSet, PredictError>) -> Result<usize, PredictError> {
        self.finish_request();

        match result {
            Ok(data) => {
                let supplied = data.len();
                self.sync.apply_external(&with_midpoint_defaults(&data));

                if data.is_empty() {
                    self.notify(
                        "Live data contained no known parameters; using range midpoints.",
                        AlertSeverity::Warning,
                    );
                } else {
                    self.notify(
                        format!(
                            "Live data synced ({} of {} parameters).",
                            supplied,
                            catalog::parameters().len()
                        ),
                        AlertSeverity::Success,
                    );
                }
                self.last_fetched = Some(data);
                Ok(supplied)
            }
            Err(err) => {
                self.notify(format!("Data sync failed: {}", err), AlertSeverity::Error);
                Err(err)
            }
        }
    }

    /// Build a report of the current score and the readings it was computed
    /// from, if a score has been shown
    pub fn report(&self) -> Option<ReportSnapshot> {
        let score = self.current.as_ref()?;
        let scored = self.last_scored.as_ref()?;
        Some(report::assemble(
            score.wqi,
            &score.assessment,
            scored,
            self.last_fetched.as_ref(),
            &self.recommendations,
        ))
    }

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.port.show_working(false);
        }
    }

    fn notify(&mut self, message: impl Into<String>, severity: AlertSeverity) {
        let alert = self.alerts.push(message, severity);
        self.port.show_alert(&alert);
    }

    pub fn controls(&self) -> Vec<ControlState> {
        self.sync.controls()
    }

    pub fn control(&self, param_id: &str) -> Option<ControlState> {
        self.sync.control(param_id).cloned()
    }

    pub fn history(&self) -> Vec<HistoryPoint> {
        self.history.snapshot()
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.entries()
    }

    pub fn current_score(&self) -> Option<&ScoreResult> {
        self.current.as_ref()
    }

    pub fn last_fetched(&self) -> Option<&ReadingSet> {
        self.last_fetched.as_ref()
    }

    pub fn last_prediction_at(&self) -> Option<DateTime<Utc>> {
        self.last_prediction_at
    }

    pub fn is_working(&self) -> bool {
        self.in_flight > 0
    }

    pub fn port(&self) -> &R {
        &self.port
    }
}
