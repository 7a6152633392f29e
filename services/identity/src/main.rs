//! Identity Service

use std::sync::Arc;
use std::time::Duration;

use keygate_auth_core::TokenService;
use keygate_config::AppConfig;
use keygate_identity::api::http::{build_router, AppState};
use keygate_identity::infrastructure::persistence::InMemoryUserRepository;
use secrecy::ExposeSecret;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // 加载配置
    let config = AppConfig::load("config")?;

    // 初始化遥测
    if config.is_production() {
        keygate_telemetry::init_tracing_json(&config.telemetry.log_level);
    } else {
        keygate_telemetry::init_tracing(&config.telemetry.log_level);
    }
    let metrics_handle = keygate_telemetry::init_metrics();

    info!(app = %config.app_name, env = %config.app_env, "starting identity service");

    // 签名密钥装载一次，此后只读
    let token_service = TokenService::new(
        config.jwt.secret.expose_secret(),
        config.jwt.expires_in,
        config.jwt.refresh_expires_in,
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
    );

    let user_repo = Arc::new(InMemoryUserRepository::new());
    let state = AppState::new(
        user_repo,
        token_service,
        Duration::from_secs(config.handshake.ttl_secs),
        Some(metrics_handle),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "HTTP server starting");

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
