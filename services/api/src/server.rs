use crate::cli::ServeArgs;
use crate::infra::{seed_roles, AppState, InMemoryBoardStore, StaticTokenPolicy};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talentboard::auth::AccessPolicy;
use talentboard::board::applications::ApplicationLifecycle;
use talentboard::board::organizations::OrganizationService;
use talentboard::board::users::DirectoryService;
use talentboard::config::AppConfig;
use talentboard::error::AppError;
use talentboard::telemetry;
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

    let store = Arc::new(InMemoryBoardStore::default());
    seed_roles(&store);

    let policy: Arc<dyn AccessPolicy> = Arc::new(StaticTokenPolicy::from_env());
    let lifecycle = Arc::new(ApplicationLifecycle::new(store.clone(), store.clone()));
    let directory = Arc::new(DirectoryService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let organizations = Arc::new(OrganizationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    let app = with_board_routes(lifecycle, directory, organizations, policy)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
