//! 刷新令牌轮换处理器

use std::sync::Arc;

use async_trait::async_trait;
use keygate_cqrs_core::CommandHandler;
use keygate_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::RefreshTokenCommand;
use crate::application::dto::{SessionView, UserView};
use crate::application::services::{SessionGuard, SessionService};
use crate::domain::repositories::UserRepository;

pub struct RefreshTokenHandler {
    user_repo: Arc<dyn UserRepository>,
    guard: Arc<SessionGuard>,
    sessions: Arc<SessionService>,
}

impl RefreshTokenHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        guard: Arc<SessionGuard>,
        sessions: Arc<SessionService>,
    ) -> Self {
        Self {
            user_repo,
            guard,
            sessions,
        }
    }
}

#[async_trait]
impl CommandHandler<RefreshTokenCommand> for RefreshTokenHandler {
    async fn handle(&self, command: RefreshTokenCommand) -> AppResult<SessionView> {
        // 信封校验确定"谁在主张刷新"；指纹是否仍有效由轮换决定
        let claims = self.guard.authenticate_refresh(&command.refresh_token)?;
        let user_id = claims.user_id()?;

        let token = self.sessions.rotate(&user_id, &command.refresh_token).await?;

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("No session record for user"))?;

        info!(%user_id, "refresh token rotated");

        Ok(SessionView {
            user: UserView::from(&user),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::value_objects::{Email, HashedPassword, Username};
    use crate::infrastructure::persistence::InMemoryUserRepository;
    use keygate_auth_core::TokenService;
    use keygate_common::UserId;

    fn setup() -> (RefreshTokenHandler, Arc<SessionService>, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let token_service = Arc::new(TokenService::new(
            "test_secret",
            900,
            604800,
            "keygate".to_string(),
            "keygate-clients".to_string(),
        ));
        let guard = Arc::new(SessionGuard::new(repo.clone(), token_service.clone()));
        let sessions = Arc::new(SessionService::new(repo.clone(), token_service));
        (
            RefreshTokenHandler::new(repo.clone(), guard, sessions.clone()),
            sessions,
            repo,
        )
    }

    async fn seed_user(repo: &InMemoryUserRepository) -> UserId {
        let user = User::new(
            Username::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            HashedPassword::from_plain("Test1234!").unwrap(),
        );
        let id = user.id.clone();
        repo.create(&user).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_rotation_returns_new_pair_and_user_fields() {
        let (handler, sessions, repo) = setup();
        let user_id = seed_user(&repo).await;
        let pair = sessions.issue(&user_id).await.unwrap();

        let result = handler
            .handle(RefreshTokenCommand {
                refresh_token: pair.refresh_token.clone(),
            })
            .await
            .unwrap();

        assert_eq!(result.user.username, "alice");
        assert_ne!(result.token.refresh_token, pair.refresh_token);
    }

    #[tokio::test]
    async fn test_access_token_is_rejected_as_refresh() {
        let (handler, sessions, repo) = setup();
        let user_id = seed_user(&repo).await;
        let pair = sessions.issue(&user_id).await.unwrap();

        let result = handler
            .handle(RefreshTokenCommand {
                refresh_token: pair.access_token,
            })
            .await;

        assert!(matches!(result, Err(AppError::TokenInvalid(_))));
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_unauthenticated() {
        let (handler, _, repo) = setup();
        let user_id = seed_user(&repo).await;

        // 信封有效，但该用户没有会话记录
        let token_service = TokenService::new(
            "test_secret",
            900,
            604800,
            "keygate".to_string(),
            "keygate-clients".to_string(),
        );
        let token = token_service.generate_refresh_token(&user_id).unwrap();

        let result = handler
            .handle(RefreshTokenCommand {
                refresh_token: token,
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }
}
