//! Operational alert log
//!
//! Append-only, displayed most recent first. Every entry is mirrored to
//! tracing at the matching level.

use tracing::{error, info, warn};

use crate::models::{Alert, AlertSeverity};

#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    // oldest first
    entries: Vec<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an alert and return a copy of the stored entry
    pub fn push(&mut self, message: impl Into<String>, severity: AlertSeverity) -> Alert {
        let alert = Alert::new(message, severity);

        match severity {
            AlertSeverity::Info | AlertSeverity::Success => {
                info!(alert_id = %alert.id, severity = ?severity, "{}", alert.message)
            }
            AlertSeverity::Warning => warn!(alert_id = %alert.id, "{}", alert.message),
            AlertSeverity::Error => error!(alert_id = %alert.id, "{}", alert.message),
        }

        self.entries.push(alert.clone());
        alert
    }

    /// Entries, most recent first
    pub fn entries(&self) -> Vec<Alert> {
        self.entries.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_recent_first() {
        let mut log = AlertLog::new();
        log.push("Contacting live data source...", AlertSeverity::Info);
        log.push("Live data synced.", AlertSeverity::Success);
        log.push("Scoring failed", AlertSeverity::Error);

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "Scoring failed");
        assert_eq!(entries[0].severity, AlertSeverity::Error);
        assert_eq!(entries[2].severity, AlertSeverity::Info);
    }

    #[test]
    fn test_push_returns_stored_alert() {
        let mut log = AlertLog::new();
        let first = log.push("Missing input for pH Level", AlertSeverity::Warning);
        let second = log.push("Analysis Complete. WQI: 81", AlertSeverity::Success);

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], second);
        assert_eq!(entries[1], first);
        assert_eq!(entries[1].severity, AlertSeverity::Warning);
    }
}
