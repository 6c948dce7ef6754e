//! PDF Text Extraction Orchestrator
//!
//! This library provides the core functionality for the extraction service,
//! which hands remotely hosted PDFs to PDF.co for asynchronous text
//! conversion, tracks each conversion job in the background, and records the
//! extracted text (or the failure reason) on the matching Supabase document.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
