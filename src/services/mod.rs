pub mod conversion;
pub mod document_store;
pub mod notifier;
pub mod submitter;
pub mod tracker;
