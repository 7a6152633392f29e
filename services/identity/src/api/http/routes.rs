//! 认证路由

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use keygate_cqrs_core::{CommandHandler, QueryHandler};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::commands::{
    EncryptedCredential, GetProfileQuery, LoginCommand, LogoutCommand, RefreshTokenCommand,
    RegisterCommand,
};
use crate::application::dto::{SessionView, UserView};
use crate::domain::services::HandshakeOffer;

use super::error::ApiError;
use super::middleware::{auth_middleware, AuthClaims};
use super::AppState;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/profile", get(profile))
        .route("/api/auth/logout", get(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/auth/handshake", post(handshake))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// 加密登录信封：存在时 password 字段是 base64 密文
#[derive(Debug, Deserialize)]
pub struct HandshakePayload {
    pub handshake_id: String,
    pub client_public_key: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub handshake: Option<HandshakePayload>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

async fn handshake(State(state): State<AppState>) -> Json<HandshakeOffer> {
    Json(state.key_exchange.negotiate().await)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .register
        .handle(RegisterCommand {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
        })
        .await?;

    Ok(StatusCode::CREATED)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let result = state
        .login
        .handle(LoginCommand {
            username: req.username,
            password: req.password,
            handshake: req.handshake.map(|h| EncryptedCredential {
                handshake_id: h.handshake_id,
                client_public_key: h.client_public_key,
            }),
        })
        .await?;

    Ok(Json(result))
}

async fn profile(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<UserView>, ApiError> {
    let user_id = claims.user_id()?;
    let view = state.profile.handle(GetProfileQuery { user_id }).await?;
    Ok(Json(view))
}

async fn logout(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<SuccessResponse>, ApiError> {
    let user_id = claims.user_id()?;
    state.logout.handle(LogoutCommand { user_id }).await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: None,
    }))
}

async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let result = state
        .refresh
        .handle(RefreshTokenCommand {
            refresh_token: req.refresh_token,
        })
        .await?;

    Ok(Json(result))
}

async fn health() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    match &state.metrics {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}
