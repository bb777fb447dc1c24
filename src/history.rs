//! Rolling score history for the trend chart

use std::collections::VecDeque;
use tracing::debug;

use crate::models::HistoryPoint;

/// Maximum number of points kept for the chart
pub const HISTORY_CAPACITY: usize = 10;

/// Bounded FIFO of recent scores, in insertion order
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Add a point, evicting the oldest one once over capacity
    pub fn append(&mut self, label: impl Into<String>, wqi: f64) {
        self.points.push_back(HistoryPoint {
            label: label.into(),
            wqi,
        });

        if self.points.len() > self.capacity {
            if let Some(evicted) = self.points.pop_front() {
                debug!(label = %evicted.label, wqi = evicted.wqi, "Evicted oldest history point");
            }
        }
    }

    pub fn snapshot(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_snapshot() {
        let mut history = HistoryBuffer::new();
        history.append("10:00", 72.0);
        history.append("10:05", 68.0);

        let snap = history.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].label, "10:00");
        assert_eq!(snap[1].wqi, 68.0);
    }

    #[test]
    fn test_bounded_to_ten_most_recent() {
        let mut history = HistoryBuffer::new();
        for i in 0..15 {
            history.append(format!("T{}", i), i as f64);
        }

        let snap = history.snapshot();
        assert_eq!(snap.len(), HISTORY_CAPACITY);
        let labels: Vec<&str> = snap.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["T5", "T6", "T7", "T8", "T9", "T10", "T11", "T12", "T13", "T14"]
        );
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut history = HistoryBuffer::new();
        history.append("a", 1.0);
        let _ = history.snapshot();
        let _ = history.snapshot();
        assert_eq!(history.snapshot().len(), 1);
    }
}
