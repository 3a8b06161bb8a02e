//! Application state for Axum handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;
use crate::service::{ExerciseService, UserService};
use crate::storage::traits::Storage;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Storage backend.
    pub storage: Arc<dyn Storage>,
    /// User service.
    pub user_service: Arc<UserService>,
    /// Exercise service.
    pub exercise_service: Arc<ExerciseService>,
    /// Prometheus render handle, present when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: Arc<AppConfig>, storage: Arc<dyn Storage>) -> Self {
        let user_service = Arc::new(UserService::new(Arc::clone(&storage)));

        let exercise_service = Arc::new(ExerciseService::new(
            Arc::clone(&storage),
            Arc::clone(&user_service),
        ));

        Self {
            config,
            storage,
            user_service,
            exercise_service,
            metrics: None,
        }
    }

    /// Expose metrics recorded through `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
