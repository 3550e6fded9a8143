use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use flightline::config::AppConfig;
use flightline::error::AppError;
use flightline::telemetry;
use flightline::workflows::preflight::assessments::AssessmentService;

use crate::cli::ServeArgs;
use crate::infra::{
    default_catalog, AppState, InMemoryAlertPublisher, InMemoryAssessmentRepository,
};
use crate::routes::with_assessment_routes;

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

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let assessment_service = Arc::new(AssessmentService::new(
        default_catalog(),
        repository,
        alerts,
        config.scoring,
    )?);

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "preflight assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
