use std::sync::Arc;

use crate::artifacts::ArtifactContext;
use crate::config::Config;
use crate::store::{ChatStore, ProfileStore};
use crate::workflow::WorkflowClient;

/// Shared application state injected into all route handlers via Axum
/// extractors. The store and workflow collaborators sit behind trait objects
/// so tests can swap in in-memory and scripted implementations.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub chat_store: Arc<dyn ChatStore>,
    pub workflow: Arc<dyn WorkflowClient>,
    pub config: Config,
}

impl AppState {
    /// Borrowed view handed to the artifact generation functions.
    pub fn artifacts(&self) -> ArtifactContext<'_> {
        ArtifactContext {
            store: self.store.as_ref(),
            workflow: self.workflow.as_ref(),
            keys: &self.config.workflow_keys,
        }
    }
}
