use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::extraction::{ErrorResponse, ExtractTextRequest, ExtractTextResponse};
use crate::services::submitter::SubmitError;

/// POST /extract-text — start text extraction for a remote PDF.
///
/// Answers `202 Accepted` once the conversion job exists; the outcome of the
/// job itself only ever shows up on the document record.
pub async fn extract_text(
    State(state): State<AppState>,
    payload: Result<Json<ExtractTextRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExtractTextResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unreadable extraction request");
        ApiError::Validation
    })?;

    if let Err(report) = request.validate() {
        tracing::debug!(error = %report, "Invalid extraction request");
        return Err(ApiError::Validation);
    }

    let ack = state
        .submitter
        .submit(&request.doc_id, &request.pdf_url)
        .await?;

    metrics::counter!("extraction_jobs_submitted_total").increment(1);

    Ok((StatusCode::ACCEPTED, Json(ack)))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("pdfUrl and docId are required")]
    Validation,

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::Submit(SubmitError::IncompleteReceipt) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Submit(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation => "validation",
            ApiError::Submit(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        metrics::counter!("extraction_jobs_rejected_total", "reason" => self.kind()).increment(1);

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
