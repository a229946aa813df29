use aid_intake::config::{AppConfig, StorageConfig};
use aid_intake::intake::{
    AssistRequester, ChatCompletionsClient, Clock, DraftStore, FileDraftStore, FormState,
    LocationCatalog, MemoryDraftStore, MockSubmissionGateway, WizardController,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

const LOCATIONS_UNAVAILABLE: &str = "Failed to load locations";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog plus the banner to show when it could not be read. A broken dataset
/// leaves the wizard usable with empty location selects.
pub(crate) async fn load_catalog(storage: &StorageConfig) -> (LocationCatalog, Option<String>) {
    let loaded = match &storage.locations_path {
        Some(path) => LocationCatalog::load(path).await,
        None => LocationCatalog::bundled(),
    };

    match loaded {
        Ok(catalog) => (catalog, None),
        Err(err) => {
            warn!(error = %err, "location dataset unavailable");
            (
                LocationCatalog::default(),
                Some(format!("{LOCATIONS_UNAVAILABLE}: {err}")),
            )
        }
    }
}

/// File-backed drafts when a directory is configured, otherwise in memory.
pub(crate) fn draft_store(storage: &StorageConfig) -> Arc<dyn DraftStore> {
    let Some(dir) = &storage.draft_dir else {
        return Arc::new(MemoryDraftStore::default());
    };

    match FileDraftStore::new(dir) {
        Ok(store) => {
            info!(path = %store.root().display(), "persisting drafts to disk");
            Arc::new(store)
        }
        Err(err) => {
            warn!(error = %err, path = %dir.display(), "draft directory unusable; keeping drafts in memory");
            Arc::new(MemoryDraftStore::default())
        }
    }
}

/// Assemble a wizard session from configuration.
pub(crate) async fn build_wizard(config: &AppConfig, clock: Arc<dyn Clock>) -> WizardController {
    let (catalog, banner) = load_catalog(&config.storage).await;
    let form = FormState::restore(draft_store(&config.storage));
    let gateway = Arc::new(MockSubmissionGateway::new(config.submission.delay));
    let generator = Arc::new(ChatCompletionsClient::from_config(&config.assist));
    let assist = AssistRequester::with_timeout(generator, config.assist.timeout);

    let wizard = WizardController::new(form, Arc::new(catalog), gateway)
        .with_clock(clock)
        .with_assist(Arc::new(assist));

    match banner {
        Some(banner) => wizard.with_location_banner(banner),
        None => wizard,
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
