//! 会话守卫
//!
//! 请求期的认证闸口。访问令牌走无状态校验（签名 + 过期），
//! 刷新令牌这里只校验信封（谁在主张刷新）；指纹是否仍有效
//! 由 `SessionService::rotate` 做有状态检查。守卫不重试、不恢复。

use std::sync::Arc;

use keygate_auth_core::{Claims, TokenService};
use keygate_errors::{AppError, AppResult};
use tracing::debug;

use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::domain::services::PasswordService;
use crate::domain::value_objects::Username;

/// 会话守卫
pub struct SessionGuard {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl SessionGuard {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// 本地凭据认证（登录）
    ///
    /// "用户不存在" 与 "密码错误" 对外不可区分，防止用户名枚举
    pub async fn authenticate_local(&self, username: &str, password: &str) -> AppResult<User> {
        let username = Username::new(username).map_err(|_| AppError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_username(&username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = PasswordService::verify_password(password, &user.password_hash)?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active() {
            return Err(AppError::unauthenticated("User account is not active"));
        }

        debug!(user_id = %user.id, "local credentials verified");
        Ok(user)
    }

    /// 访问令牌认证（无状态快路径，不查存储）
    pub fn authenticate_access(&self, token: &str) -> AppResult<Claims> {
        self.token_service.validate_access_token(token)
    }

    /// 刷新令牌信封认证（签名 + 过期 + 类型）
    pub fn authenticate_refresh(&self, token: &str) -> AppResult<Claims> {
        self.token_service.validate_refresh_token(token)
    }
}
