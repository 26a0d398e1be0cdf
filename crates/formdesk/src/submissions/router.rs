use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::admin::{AdminDirectory, AdminGate};
use super::csv::render_csv;
use super::domain::SubmissionForm;
use super::export::{ExportBridge, ExportError};
use super::notify::NotificationDispatcher;
use super::repository::SubmissionRepository;
use super::service::{AdminExportError, IntakeError, SubmissionIntakeService};

/// Admin identity header checked against the directory on every privileged
/// request.
pub const ADMIN_EMAIL_HEADER: &str = "x-admin-email";

/// Everything the HTTP surface needs: the intake service plus the
/// authorization gate consulted before each admin view.
pub struct SubmissionApi<R, N, E, D> {
    pub service: SubmissionIntakeService<R, N, E>,
    pub gate: AdminGate<D>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorizeRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchExportRequest {
    #[serde(default)]
    webhook_url: Option<String>,
}

/// Router builder exposing intake and admin endpoints.
pub fn submission_router<R, N, E, D>(api: Arc<SubmissionApi<R, N, E, D>>) -> Router
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
    D: AdminDirectory + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(intake_handler::<R, N, E, D>))
        .route(
            "/api/v1/admin/authorize",
            post(authorize_handler::<R, N, E, D>),
        )
        .route(
            "/api/v1/admin/submissions",
            get(listing_handler::<R, N, E, D>),
        )
        .route(
            "/api/v1/admin/submissions.csv",
            get(csv_handler::<R, N, E, D>),
        )
        .route(
            "/api/v1/admin/export",
            post(batch_export_handler::<R, N, E, D>),
        )
        .with_state(api)
}

pub(crate) async fn intake_handler<R, N, E, D>(
    State(api): State<Arc<SubmissionApi<R, N, E, D>>>,
    Json(form): Json<SubmissionForm>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
    D: AdminDirectory + 'static,
{
    match api.service.intake(form).await {
        Ok(receipt) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "submissionId": receipt.submission_id.0,
            })),
        )
            .into_response(),
        Err(IntakeError::Validation(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response(),
        Err(IntakeError::Persistence(err)) => {
            // Internal detail stays in the log; the submitter gets a generic
            // message.
            error!(error = %err, "submission persistence failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unable to save submission" })),
            )
                .into_response()
        }
    }
}

/// Pre-sign-in check. Unknown, case-variant, and malformed addresses all get
/// the same answer so the response confirms nothing about the admin set.
pub(crate) async fn authorize_handler<R, N, E, D>(
    State(api): State<Arc<SubmissionApi<R, N, E, D>>>,
    Json(request): Json<AuthorizeRequest>,
) -> Json<serde_json::Value>
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
    D: AdminDirectory + 'static,
{
    Json(json!({ "authorized": api.gate.authorize(&request.email) }))
}

pub(crate) async fn listing_handler<R, N, E, D>(
    State(api): State<Arc<SubmissionApi<R, N, E, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
    D: AdminDirectory + 'static,
{
    if !admin_allowed(&api.gate, &headers) {
        return access_denied();
    }

    match api.service.listing() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to load submissions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unable to load submissions" })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn csv_handler<R, N, E, D>(
    State(api): State<Arc<SubmissionApi<R, N, E, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
    D: AdminDirectory + 'static,
{
    if !admin_allowed(&api.gate, &headers) {
        return access_denied();
    }

    let records = match api.service.listing() {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "failed to load submissions for csv export");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unable to load submissions" })),
            )
                .into_response();
        }
    };

    match render_csv(&records) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "csv rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unable to render csv" })),
            )
                .into_response()
        }
    }
}

/// Foreground export: unlike intake-time sync, failures here are surfaced to
/// the acting admin.
pub(crate) async fn batch_export_handler<R, N, E, D>(
    State(api): State<Arc<SubmissionApi<R, N, E, D>>>,
    headers: HeaderMap,
    Json(request): Json<BatchExportRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    N: NotificationDispatcher + 'static,
    E: ExportBridge + 'static,
    D: AdminDirectory + 'static,
{
    if !admin_allowed(&api.gate, &headers) {
        return access_denied();
    }

    match api.service.export_all(request.webhook_url.as_deref()).await {
        Ok(exported) => (
            StatusCode::OK,
            Json(json!({ "success": true, "exported": exported })),
        )
            .into_response(),
        Err(AdminExportError::Export(ExportError::NotConfigured)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "export target not configured" })),
        )
            .into_response(),
        Err(AdminExportError::Export(err)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": format!("export failed: {err}") })),
        )
            .into_response(),
        Err(AdminExportError::Repository(err)) => {
            error!(error = %err, "failed to load submissions for batch export");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unable to load submissions" })),
            )
                .into_response()
        }
    }
}

fn admin_allowed<D>(gate: &AdminGate<D>, headers: &HeaderMap) -> bool
where
    D: AdminDirectory,
{
    headers
        .get(ADMIN_EMAIL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|email| gate.authorize(email))
        .unwrap_or(false)
}

/// Uniform refusal for every gated endpoint; no detail about why leaks out.
fn access_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "access denied" })),
    )
        .into_response()
}
