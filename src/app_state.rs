use std::sync::Arc;

use crate::services::{
    conversion::ConversionService,
    document_store::DocumentStore,
    notifier::Notifier,
    submitter::Submitter,
    tracker::{PollPolicy, Tracker},
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub submitter: Arc<Submitter>,
}

impl AppState {
    pub fn new(
        conversion: Arc<dyn ConversionService>,
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
        policy: PollPolicy,
    ) -> Self {
        let tracker = Arc::new(Tracker::new(conversion.clone(), store, notifier, policy));

        Self {
            submitter: Arc::new(Submitter::new(conversion, tracker)),
        }
    }
}
