//! Scoring and live-data client
//!
//! Talks to the external scoring service. The service computes the water
//! quality index; this client only validates what is sent and normalizes
//! what comes back.
//!
//! Wire format:
//! - `POST {scoring}/api/predict` with a flat `{param_id: number}` body,
//!   answered by `{ "wqi": number, "assessment": string }`
//! - `GET {live}/api/get-live-data` answered by a flat `{param_id: number}`

use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::config::ScoringSettings;
use crate::error::PredictError;
use crate::models::{ReadingSet, ScoreResult, Tier};
use crate::validation::{ensure_complete, parse_control_value};

pub const PREDICT_PATH: &str = "/api/predict";
pub const LIVE_DATA_PATH: &str = "/api/get-live-data";

#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    predict_url: String,
    live_data_url: String,
}

impl PredictionClient {
    pub fn new(settings: &ScoringSettings) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if settings.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(settings.timeout_ms));
        }

        Ok(Self {
            http: builder.build()?,
            predict_url: join_url(&settings.base_url, PREDICT_PATH),
            live_data_url: join_url(&settings.live_data_url, LIVE_DATA_PATH),
        })
    }

    /// Submit a complete reading set and return the normalized score.
    ///
    /// An incomplete set fails with [`PredictError::Validation`] before any
    /// request is made.
    pub async fn predict(&self, readings: &ReadingSet) -> Result<ScoreResult, PredictError> {
        ensure_complete(readings)?;

        debug!(url = %self.predict_url, "Sending scoring request");

        let response = self
            .http
            .post(&self.predict_url)
            .json(readings)
            .send()
            .await
            .map_err(|e| PredictError::Service(format!("Scoring request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| PredictError::Service(format!("Unreadable scoring response: {}", e)))?;

        if !status.is_success() {
            let detail = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("no details");
            return Err(PredictError::Service(format!(
                "Scoring service returned {}: {}",
                status, detail
            )));
        }

        let score = normalize_score(&body)?;
        info!(wqi = score.wqi, assessment = %score.assessment, "Scoring request completed");
        Ok(score)
    }

    /// Fetch the latest externally measured values.
    ///
    /// Only numeric entries for catalog parameters are kept; use
    /// [`with_midpoint_defaults`] to obtain a complete set.
    pub async fn fetch_live_data(&self) -> Result<ReadingSet, PredictError> {
        debug!(url = %self.live_data_url, "Fetching live data");

        let response = self
            .http
            .get(&self.live_data_url)
            .send()
            .await
            .map_err(|e| PredictError::Service(format!("Live data request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::Service(format!(
                "Live data source returned {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PredictError::Service(format!("Unreadable live data: {}", e)))?;

        parse_live_data(&body)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Turn a scoring reply into a [`ScoreResult`].
///
/// A missing or non-numeric `wqi` is a service error. An out-of-range `wqi`
/// is clamped to [0, 100] and a missing `assessment` is derived from the
/// tier; both are logged.
pub fn normalize_score(body: &Value) -> Result<ScoreResult, PredictError> {
    let raw_wqi = body
        .get("wqi")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            PredictError::Service("Malformed scoring response: missing numeric wqi".to_string())
        })?;

    let wqi = raw_wqi.clamp(0.0, 100.0);
    if wqi != raw_wqi {
        warn!(raw_wqi, clamped = wqi, "Scoring service returned WQI outside [0, 100]");
    }

    let assessment = match body.get("assessment").and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => {
            let fallback = Tier::from_wqi(wqi).default_assessment();
            warn!(assessment = %fallback, "Scoring response has no assessment, using tier default");
            fallback.to_string()
        }
    };

    Ok(ScoreResult { wqi, assessment })
}

/// Extract catalog values from a live-data reply
pub fn parse_live_data(body: &Value) -> Result<ReadingSet, PredictError> {
    let object = body.as_object().ok_or_else(|| {
        PredictError::Service("Malformed live data: expected a JSON object".to_string())
    })?;

    Ok(readings_from_object(object))
}

/// Keep the finite numeric entries of catalog parameters.
///
/// Numeric strings are accepted. Other values are dropped with a warning, so
/// the parameter shows up as missing when the set is validated. Keys outside
/// the catalog are ignored.
pub fn readings_from_object(object: &Map<String, Value>) -> ReadingSet {
    let mut data = ReadingSet::new();
    for param in catalog::parameters() {
        let value = match object.get(param.id) {
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
            Some(Value::String(s)) => parse_control_value(s),
            _ => None,
        };
        match value {
            Some(v) => data.insert(param.id, v),
            None if object.contains_key(param.id) => {
                warn!(param_id = %param.id, "Ignoring non-numeric reading")
            }
            None => {}
        }
    }

    let unknown = object.keys().filter(|k| catalog::find(k).is_none()).count();
    if unknown > 0 {
        debug!(unknown, "Ignoring readings for unknown parameters");
    }

    data
}

/// Complete a live-data set by defaulting every absent parameter to the
/// midpoint of its range
pub fn with_midpoint_defaults(data: &ReadingSet) -> ReadingSet {
    catalog::parameters()
        .iter()
        .map(|p| {
            let value = data.get(p.id).filter(|v| v.is_finite()).unwrap_or_else(|| p.midpoint());
            (p.id.to_string(), value)
        })
        .collect()
}
