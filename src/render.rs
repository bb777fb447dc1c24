//! Rendering port
//!
//! The engine never touches presentation directly; it reports every visible
//! change through [`RenderPort`]. [`DashboardView`] is the implementation
//! served to WebSocket clients.

use serde::{Deserialize, Serialize};

use crate::models::{Alert, HistoryPoint, Tier};

pub trait RenderPort {
    /// New score; `previous` lets a renderer animate from the old value.
    fn show_score(&mut self, previous: Option<f64>, wqi: f64);
    fn show_assessment(&mut self, tier: Tier, assessment: &str);
    fn show_history(&mut self, points: &[HistoryPoint]);
    /// An empty list hides the advisory panel.
    fn show_recommendations(&mut self, entries: &[String]);
    fn show_working(&mut self, working: bool);
    fn show_alert(&mut self, alert: &Alert);
}

/// Latest state shown on the dashboard.
///
/// `revision` increases on every change so pollers can detect updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub revision: u64,
    pub wqi: Option<f64>,
    pub previous_wqi: Option<f64>,
    pub tier: Option<Tier>,
    pub assessment: Option<String>,
    pub history: Vec<HistoryPoint>,
    pub recommendations: Vec<String>,
    pub recommendations_visible: bool,
    pub working: bool,
    pub latest_alert: Option<Alert>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

impl RenderPort for DashboardView {
    fn show_score(&mut self, previous: Option<f64>, wqi: f64) {
        self.previous_wqi = previous;
        self.wqi = Some(wqi);
        self.touch();
    }

    fn show_assessment(&mut self, tier: Tier, assessment: &str) {
        self.tier = Some(tier);
        self.assessment = Some(assessment.to_string());
        self.touch();
    }

    fn show_history(&mut self, points: &[HistoryPoint]) {
        self.history = points.to_vec();
        self.touch();
    }

    fn show_recommendations(&mut self, entries: &[String]) {
        self.recommendations = entries.to_vec();
        self.recommendations_visible = !entries.is_empty();
        self.touch();
    }

    fn show_working(&mut self, working: bool) {
        if self.working != working {
            self.working = working;
            self.touch();
        }
    }

    fn show_alert(&mut self, alert: &Alert) {
        self.latest_alert = Some(alert.clone());
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertSeverity;

    #[test]
    fn test_revision_advances() {
        let mut view = DashboardView::new();
        assert_eq!(view.revision, 0);

        view.show_score(None, 81.0);
        view.show_assessment(Tier::Good, "Good Quality (Minor Issues)");
        assert_eq!(view.revision, 2);
        assert_eq!(view.tier, Some(Tier::Good));
    }

    #[test]
    fn test_recommendation_panel_visibility() {
        let mut view = DashboardView::new();
        view.show_recommendations(&["Aeration needed.".to_string()]);
        assert!(view.recommendations_visible);

        view.show_recommendations(&[]);
        assert!(!view.recommendations_visible);
    }

    #[test]
    fn test_views_compare_by_latest_alert() {
        let alert = Alert::new("Live data synced (2 of 8 parameters).", AlertSeverity::Success);
        let mut first = DashboardView::new();
        let mut second = DashboardView::new();
        first.show_alert(&alert);
        second.show_alert(&alert);
        assert_eq!(first, second);

        second.show_alert(&Alert::new("Data sync failed: timeout", AlertSeverity::Error));
        second.revision = first.revision;
        assert_ne!(first, second);
    }

    #[test]
    fn test_working_flag_only_counts_changes() {
        let mut view = DashboardView::new();
        view.show_working(false);
        assert_eq!(view.revision, 0);
        view.show_working(true);
        view.show_working(true);
        assert_eq!(view.revision, 1);
    }
}
