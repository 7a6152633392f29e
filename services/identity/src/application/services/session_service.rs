//! 会话令牌服务
//!
//! 签发（issue）、轮换（rotate）、撤销（revoke）。
//! 每个用户至多一条有效指纹：签发覆盖旧记录，轮换走 CAS，
//! 并发轮换恰好一个成功，其余观察到指纹已变，按重放处理。

use std::sync::Arc;

use keygate_auth_core::TokenService;
use keygate_common::UserId;
use keygate_errors::{AppError, AppResult};
use metrics::counter;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::application::dto::TokenPair;
use crate::domain::entities::RefreshTokenRecord;
use crate::domain::repositories::UserRepository;

/// 刷新令牌重放计数（内部告警信号；对外呈现仍是统一的 401）
const TOKEN_REUSED_COUNTER: &str = "auth_refresh_token_reused_total";

/// 刷新令牌指纹：SHA-256 单向散列，服务端只与指纹比较
pub fn fingerprint(raw_token: &str) -> String {
    hex::encode(Sha256::digest(raw_token.as_bytes()))
}

/// 会话令牌服务
pub struct SessionService {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl SessionService {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    fn generate_pair(&self, user_id: &UserId) -> AppResult<(TokenPair, RefreshTokenRecord)> {
        let access_token = self.token_service.generate_access_token(user_id)?;
        let refresh_token = self.token_service.generate_refresh_token(user_id)?;
        let record = RefreshTokenRecord::new(fingerprint(&refresh_token));

        let pair = TokenPair {
            access_token,
            refresh_token,
            expires_in: self.token_service.access_token_expires_in(),
            token_type: "Bearer".to_string(),
        };
        Ok((pair, record))
    }

    /// 签发新令牌对（登录）
    ///
    /// 覆盖写：新登录使同一用户先前签发的刷新令牌立即失效
    pub async fn issue(&self, user_id: &UserId) -> AppResult<TokenPair> {
        let (pair, record) = self.generate_pair(user_id)?;
        self.user_repo.set_refresh_token(user_id, Some(record)).await?;

        debug!(%user_id, "token pair issued");
        Ok(pair)
    }

    /// 轮换：校验出示的刷新令牌指纹，原子地替换为新令牌对
    pub async fn rotate(&self, user_id: &UserId, presented_token: &str) -> AppResult<TokenPair> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("No session record for user"))?;

        let stored = user
            .refresh_token
            .as_ref()
            .ok_or_else(|| AppError::unauthenticated("No session record for user"))?;

        let presented_fingerprint = fingerprint(presented_token);
        if stored.fingerprint != presented_fingerprint {
            warn!(%user_id, "presented refresh token does not match stored fingerprint");
            counter!(TOKEN_REUSED_COUNTER).increment(1);
            return Err(AppError::TokenReused);
        }

        let (pair, record) = self.generate_pair(user_id)?;
        let swapped = self
            .user_repo
            .swap_refresh_token(user_id, &presented_fingerprint, record)
            .await?;
        if !swapped {
            // 并发轮换竞争失败：指纹已被另一请求替换
            warn!(%user_id, "lost rotation race, treating as reuse");
            counter!(TOKEN_REUSED_COUNTER).increment(1);
            return Err(AppError::TokenReused);
        }

        debug!(%user_id, "refresh token rotated");
        Ok(pair)
    }

    /// 撤销当前会话（登出）
    pub async fn revoke(&self, user_id: &UserId) -> AppResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotLoggedIn)?;

        if !user.has_active_session() {
            return Err(AppError::NotLoggedIn);
        }

        self.user_repo.set_refresh_token(user_id, None).await?;
        debug!(%user_id, "session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::value_objects::{Email, HashedPassword, Username};
    use crate::infrastructure::persistence::InMemoryUserRepository;
    use futures::future::join_all;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            "test_secret",
            900,
            604800,
            "keygate".to_string(),
            "keygate-clients".to_string(),
        ))
    }

    async fn setup() -> (Arc<InMemoryUserRepository>, Arc<SessionService>, UserId) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let user = User::new(
            Username::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            HashedPassword::from_plain("Test1234!").unwrap(),
        );
        let user_id = user.id.clone();
        repo.create(&user).await.unwrap();

        let service = Arc::new(SessionService::new(repo.clone(), token_service()));
        (repo, service, user_id)
    }

    #[tokio::test]
    async fn test_issue_stores_fingerprint_of_refresh_token() {
        let (repo, service, user_id) = setup().await;

        let pair = service.issue(&user_id).await.unwrap();
        let user = repo.find_by_id(&user_id).await.unwrap().unwrap();
        let record = user.refresh_token.unwrap();

        assert_eq!(record.fingerprint, fingerprint(&pair.refresh_token));
        // 原始令牌不落库
        assert_ne!(record.fingerprint, pair.refresh_token);
    }

    #[tokio::test]
    async fn test_rotation_is_single_use() {
        let (_, service, user_id) = setup().await;

        let first = service.issue(&user_id).await.unwrap();
        let second = service.rotate(&user_id, &first.refresh_token).await.unwrap();

        // 旧令牌重放
        let replay = service.rotate(&user_id, &first.refresh_token).await;
        assert!(matches!(replay, Err(AppError::TokenReused)));

        // 新令牌正常轮换
        assert!(service.rotate(&user_id, &second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_rotation_has_exactly_one_winner() {
        let (_, service, user_id) = setup().await;
        let pair = service.issue(&user_id).await.unwrap();

        let attempts = 8;
        let results = join_all((0..attempts).map(|_| {
            let service = service.clone();
            let user_id = user_id.clone();
            let token = pair.refresh_token.clone();
            async move { service.rotate(&user_id, &token).await }
        }))
        .await;

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let reused = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::TokenReused)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(reused, attempts - 1);
    }

    #[tokio::test]
    async fn test_rotate_after_revoke_is_unauthenticated() {
        let (_, service, user_id) = setup().await;
        let pair = service.issue(&user_id).await.unwrap();

        service.revoke(&user_id).await.unwrap();

        let result = service.rotate(&user_id, &pair.refresh_token).await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_revoke_without_session_is_not_logged_in() {
        let (_, service, user_id) = setup().await;
        assert!(matches!(
            service.revoke(&user_id).await,
            Err(AppError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn test_new_login_supersedes_previous_refresh_token() {
        let (_, service, user_id) = setup().await;

        let first = service.issue(&user_id).await.unwrap();
        let _second = service.issue(&user_id).await.unwrap();

        let result = service.rotate(&user_id, &first.refresh_token).await;
        assert!(matches!(result, Err(AppError::TokenReused)));
    }
}
