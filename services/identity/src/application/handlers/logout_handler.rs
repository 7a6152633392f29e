//! 登出处理器

use std::sync::Arc;

use async_trait::async_trait;
use keygate_cqrs_core::CommandHandler;
use keygate_errors::AppResult;
use tracing::info;

use crate::application::commands::LogoutCommand;
use crate::application::services::SessionService;

pub struct LogoutHandler {
    sessions: Arc<SessionService>,
}

impl LogoutHandler {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl CommandHandler<LogoutCommand> for LogoutHandler {
    async fn handle(&self, command: LogoutCommand) -> AppResult<()> {
        self.sessions.revoke(&command.user_id).await?;
        info!(user_id = %command.user_id, "logout succeeded");
        Ok(())
    }
}
