//! 用户实体

use chrono::{DateTime, Utc};
use keygate_common::{AuditInfo, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Email, HashedPassword, Username};

/// 用户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Locked,
}

/// 当前有效刷新令牌的服务端记录
///
/// 只存指纹（SHA-256），原始令牌永远不落库。每个用户至多一条：
/// 新的签发覆盖旧的，记录缺失即视为已登出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub fingerprint: String,
    pub issued_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            issued_at: Utc::now(),
        }
    }
}

/// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub display_name: Option<String>,
    pub status: UserStatus,
    pub refresh_token: Option<RefreshTokenRecord>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub audit_info: AuditInfo,
}

impl User {
    pub fn new(username: Username, email: Email, password_hash: HashedPassword) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            display_name: None,
            status: UserStatus::default(),
            refresh_token: None,
            last_login_at: None,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn lock(&mut self) {
        self.status = UserStatus::Locked;
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.audit_info.touch();
    }

    /// 覆盖或清除刷新令牌记录
    pub fn set_refresh_token(&mut self, record: Option<RefreshTokenRecord>) {
        self.refresh_token = record;
        self.audit_info.touch();
    }

    pub fn has_active_session(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::new(
            Username::new("testuser").unwrap(),
            Email::new("test@example.com").unwrap(),
            HashedPassword::from_plain("Test1234!").unwrap(),
        )
    }

    #[test]
    fn test_new_user_is_active_and_logged_out() {
        let user = create_test_user();
        assert!(user.is_active());
        assert!(!user.has_active_session());
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_set_refresh_token_overwrites() {
        let mut user = create_test_user();
        user.set_refresh_token(Some(RefreshTokenRecord::new("fp-1")));
        user.set_refresh_token(Some(RefreshTokenRecord::new("fp-2")));

        assert_eq!(user.refresh_token.as_ref().unwrap().fingerprint, "fp-2");
    }

    #[test]
    fn test_clear_refresh_token_means_logged_out() {
        let mut user = create_test_user();
        user.set_refresh_token(Some(RefreshTokenRecord::new("fp-1")));
        user.set_refresh_token(None);

        assert!(!user.has_active_session());
    }

    #[test]
    fn test_locked_user_is_not_active() {
        let mut user = create_test_user();
        user.lock();
        assert!(!user.is_active());
    }
}
