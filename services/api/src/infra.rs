use casework::config::StoreConfig;
use casework::workflows::applicants::{load_store, ImportError, InMemoryCaseStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the case store, hydrating it from CSV exports when configured.
pub(crate) fn build_store(config: &StoreConfig) -> Result<InMemoryCaseStore, ImportError> {
    match &config.applicants_csv {
        Some(applicants) => {
            let store = load_store(applicants, config.children_csv.as_ref())?;
            let loaded = store.applicants()?.len();
            info!(path = %applicants.display(), loaded, "seeded case store from export");
            Ok(store)
        }
        None => Ok(InMemoryCaseStore::new()),
    }
}
