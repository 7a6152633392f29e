//! HTTP API

pub mod error;
pub mod middleware;
pub mod routes;

pub use routes::build_router;

use std::sync::Arc;
use std::time::Duration;

use keygate_auth_core::TokenService;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::application::handlers::{
    GetProfileHandler, LoginHandler, LogoutHandler, RefreshTokenHandler, RegisterHandler,
};
use crate::application::services::{SessionGuard, SessionService};
use crate::domain::repositories::UserRepository;
use crate::domain::services::KeyExchangeService;

/// HTTP 层共享状态
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<SessionGuard>,
    pub key_exchange: Arc<KeyExchangeService>,
    pub register: Arc<RegisterHandler>,
    pub login: Arc<LoginHandler>,
    pub refresh: Arc<RefreshTokenHandler>,
    pub logout: Arc<LogoutHandler>,
    pub profile: Arc<GetProfileHandler>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// 组装全部应用服务与处理器
    ///
    /// 签名密钥随 `TokenService` 在启动时构造一次，此后只读共享
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_service: TokenService,
        handshake_ttl: Duration,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let token_service = Arc::new(token_service);
        let guard = Arc::new(SessionGuard::new(user_repo.clone(), token_service.clone()));
        let sessions = Arc::new(SessionService::new(user_repo.clone(), token_service));
        let key_exchange = Arc::new(KeyExchangeService::new(handshake_ttl));

        Self {
            guard: guard.clone(),
            key_exchange: key_exchange.clone(),
            register: Arc::new(RegisterHandler::new(user_repo.clone())),
            login: Arc::new(LoginHandler::new(
                user_repo.clone(),
                guard.clone(),
                sessions.clone(),
                key_exchange,
            )),
            refresh: Arc::new(RefreshTokenHandler::new(
                user_repo.clone(),
                guard,
                sessions.clone(),
            )),
            logout: Arc::new(LogoutHandler::new(sessions)),
            profile: Arc::new(GetProfileHandler::new(user_repo)),
            metrics,
        }
    }
}
