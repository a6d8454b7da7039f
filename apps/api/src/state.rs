use crate::config::Config;
use crate::form::controller::FormController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store and the analysis pipeline.
    pub controller: FormController,
    pub config: Config,
}
