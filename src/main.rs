use campusdesk::logging::{init_tracing, shutdown_tracer};
use campusdesk::metrics::{init_metrics, metrics_app};
use campusdesk::modules::auth::service::AuthService;
use campusdesk::router::init_router;
use campusdesk::state::init_app_state;
use campusdesk::utils::email::Mailer;
use campusdesk_db::run_migrations;
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await;

    run_migrations(&state.db)
        .await
        .expect("Failed to run database migrations");

    if let Err(e) = AuthService::ensure_default_admin(&state.db, &state.server_config).await {
        error!(error = %e.error, "Failed to ensure default admin account");
    }

    if let Some(handle) = init_metrics() {
        let metrics_addr = format!("0.0.0.0:{}", state.server_config.metrics_port);
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .expect("Failed to bind metrics listener");
        info!(addr = %metrics_addr, "Metrics available at /metrics");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let addr = format!("0.0.0.0:{}", state.server_config.port);
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!(addr = %addr, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    Mailer::shutdown();
    shutdown_tracer().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
