//! 登录处理器

use std::sync::Arc;

use async_trait::async_trait;
use keygate_common::HandshakeId;
use keygate_cqrs_core::CommandHandler;
use keygate_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::LoginCommand;
use crate::application::dto::{SessionView, UserView};
use crate::application::services::{SessionGuard, SessionService};
use crate::domain::repositories::UserRepository;
use crate::domain::services::KeyExchangeService;

pub struct LoginHandler {
    user_repo: Arc<dyn UserRepository>,
    guard: Arc<SessionGuard>,
    sessions: Arc<SessionService>,
    key_exchange: Arc<KeyExchangeService>,
}

impl LoginHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        guard: Arc<SessionGuard>,
        sessions: Arc<SessionService>,
        key_exchange: Arc<KeyExchangeService>,
    ) -> Self {
        Self {
            user_repo,
            guard,
            sessions,
            key_exchange,
        }
    }
}

#[async_trait]
impl CommandHandler<LoginCommand> for LoginHandler {
    async fn handle(&self, command: LoginCommand) -> AppResult<SessionView> {
        // 加密信封存在时，password 字段是待解密的密文
        let password = match &command.handshake {
            Some(envelope) => {
                let handshake_id = HandshakeId::from_string(&envelope.handshake_id)
                    .map_err(|_| AppError::validation("Invalid handshake ID"))?;
                self.key_exchange
                    .decrypt(&handshake_id, &envelope.client_public_key, &command.password)
                    .await?
            }
            None => command.password.clone(),
        };

        let user = self
            .guard
            .authenticate_local(&command.username, &password)
            .await?;

        let token = self.sessions.issue(&user.id).await?;
        self.user_repo.record_login(&user.id).await?;

        info!(user_id = %user.id, "login succeeded");

        Ok(SessionView {
            user: UserView::from(&user),
            token,
        })
    }
}
