use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubmissionRepository};
use crate::routes::with_submission_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use formdesk::config::AppConfig;
use formdesk::error::AppError;
use formdesk::submissions::{
    create_dispatcher, AdminGate, StaticAdminDirectory, SubmissionApi, SubmissionIntakeService,
    WebhookExporter,
};
use formdesk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemorySubmissionRepository::default());
    let notifier = Arc::new(create_dispatcher(config.notification.as_ref())?);
    let exporter = Arc::new(WebhookExporter::new(config.export.webhook_url.clone())?);
    let service = SubmissionIntakeService::new(repository, notifier, exporter);

    let directory = Arc::new(StaticAdminDirectory::new(config.admins.emails.clone()));
    let gate = AdminGate::new(directory);

    let api = Arc::new(SubmissionApi { service, gate });

    let app = with_submission_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "form submission service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
