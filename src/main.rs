use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pdf_extract_orchestrator::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{
        conversion::PdfCoClient, document_store::SupabaseDocumentStore,
        notifier::EmbedderNotifier,
    },
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing PDF extraction orchestrator");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "extraction_jobs_submitted_total",
        "Conversion jobs accepted and handed to a tracker"
    );
    metrics::describe_counter!(
        "extraction_jobs_rejected_total",
        "Extraction requests rejected before a job was started"
    );
    metrics::describe_counter!(
        "extraction_jobs_completed_total",
        "Jobs whose extracted text was stored on the document"
    );
    metrics::describe_counter!(
        "extraction_store_writes_failed_total",
        "Terminal document updates the store did not accept, by outcome"
    );
    metrics::describe_counter!(
        "extraction_jobs_failed_total",
        "Jobs resolved as failed, by reason"
    );
    metrics::describe_counter!(
        "extraction_status_checks_total",
        "PDF.co job status checks issued"
    );
    metrics::describe_gauge!(
        "extraction_jobs_in_flight",
        "Trackers currently polling a conversion job"
    );
    metrics::describe_histogram!(
        "extraction_job_duration_seconds",
        "Time from tracker start to job resolution"
    );

    tracing::info!("Initializing PDF.co client");
    let conversion = PdfCoClient::new(&config.pdf_co_base_url, &config.pdf_co_api_key)
        .expect("Failed to initialize PDF.co client");

    tracing::info!(table = %config.document_table, "Initializing Supabase document store");
    let store = SupabaseDocumentStore::new(
        &config.supabase_url,
        &config.supabase_service_role_key,
        &config.document_table,
        &config.document_id_column,
    )
    .expect("Failed to initialize document store");

    let notifier =
        EmbedderNotifier::new(&config.embedder_url).expect("Failed to initialize embedder client");

    let policy = config.poll_policy();
    tracing::info!(
        interval_secs = policy.interval.as_secs(),
        max_wait_secs = policy.max_wait.as_secs(),
        "Job polling policy"
    );

    // Create shared application state
    let state = AppState::new(
        Arc::new(conversion),
        Arc::new(store),
        Arc::new(notifier),
        policy,
    );

    let app = routes::router(state)
        // Prometheus metrics endpoint (separate state)
        .merge(
            Router::new()
                .route("/metrics", get(routes::metrics::prometheus_metrics))
                .with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1 MB limit

    let bind_addr = config.bind_addr();
    tracing::info!("Starting PDF extraction orchestrator on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", bind_addr);

    // In-flight trackers are abandoned when the process exits.
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
