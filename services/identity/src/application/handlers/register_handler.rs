//! 注册处理器

use std::sync::Arc;

use async_trait::async_trait;
use keygate_cqrs_core::CommandHandler;
use keygate_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::RegisterCommand;
use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::domain::services::PasswordService;
use crate::domain::value_objects::{Email, Username};

pub struct RegisterHandler {
    user_repo: Arc<dyn UserRepository>,
}

impl RegisterHandler {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl CommandHandler<RegisterCommand> for RegisterHandler {
    async fn handle(&self, command: RegisterCommand) -> AppResult<()> {
        let username = Username::new(&command.username)?;
        let email = Email::new(&command.email)?;

        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username already taken"));
        }

        let password_hash = PasswordService::hash_password(&command.password)?;

        let mut user = User::new(username, email, password_hash);
        if let Some(display_name) = command.display_name {
            user = user.with_display_name(display_name);
        }

        self.user_repo.create(&user).await?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(())
    }
}
