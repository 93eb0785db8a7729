//! Shared application state for request handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::openfda::OpenFdaService;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, the openFDA label service, and the
/// readiness indicator consulted by the health probe.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub openfda: OpenFdaService,
    pub readiness: Readiness,
}

impl AppState {
    /// Creates a new application state from the given configuration and service.
    pub fn new(config: AppConfig, openfda: OpenFdaService, readiness: Readiness) -> Self {
        Self {
            config: Arc::new(config),
            openfda,
            readiness,
        }
    }
}

/// Process readiness flag, written only during startup and shutdown
/// transitions and read by the health handler.
///
/// Starts not-ready; the server marks it ready once the listener is serving
/// and flips it back when a termination signal begins the drain.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn mark_not_ready(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::Readiness;

    #[test]
    fn readiness_transitions() {
        let readiness = Readiness::default();
        assert!(!readiness.is_ready());
        readiness.mark_ready();
        assert!(readiness.is_ready());
        readiness.mark_not_ready();
        assert!(!readiness.is_ready());
    }

    #[test]
    fn clones_share_the_flag() {
        let readiness = Readiness::default();
        let observer = readiness.clone();
        readiness.mark_ready();
        assert!(observer.is_ready());
    }
}
