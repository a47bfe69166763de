use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentStore;
use crate::generation::GenerationService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Collaborators are immutable and shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub generation: Arc<GenerationService>,
    pub store: Arc<DocumentStore>,
    pub config: Config,
}
