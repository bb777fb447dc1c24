//! Application state management
//!
//! Central state container: the single engine session plus bookkeeping for
//! uptime and connected WebSocket clients.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::engine::EngineContext;
use crate::render::DashboardView;

/// Central application state
pub struct AppState {
    /// Engine session, reset only on restart
    pub engine: EngineContext<DashboardView>,
    /// Application start time
    start_time: DateTime<Utc>,
    /// Connected WebSocket clients
    connected_clients: Vec<String>,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        info!("Initializing application state");
        Self {
            engine: EngineContext::new(DashboardView::new()),
            start_time: Utc::now(),
            connected_clients: Vec::new(),
        }
    }

    /// Latest dashboard view
    pub fn view(&self) -> &DashboardView {
        self.engine.port()
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }

    /// Register a new WebSocket client
    pub fn add_client(&mut self, client_id: String) {
        info!(client_id = %client_id, "WebSocket client connected");
        self.connected_clients.push(client_id);
    }

    /// Remove a WebSocket client
    pub fn remove_client(&mut self, client_id: &str) {
        info!(client_id = %client_id, "WebSocket client disconnected");
        self.connected_clients.retain(|id| id != client_id);
    }

    /// Get count of connected clients
    pub fn client_count(&self) -> usize {
        self.connected_clients.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
