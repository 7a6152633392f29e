//! 内存用户存储
//!
//! 数据库后端的用户档案存储是外部协作方；本适配器实现同一端口，
//! 供测试与单机部署使用。所有写入在同一把写锁下完成，天然满足
//! `swap_refresh_token` 的原子性要求。

use std::collections::HashMap;

use async_trait::async_trait;
use keygate_common::UserId;
use keygate_errors::{AppError, AppResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{RefreshTokenRecord, User};
use crate::domain::repositories::UserRepository;
use crate::domain::value_objects::Username;

/// 内存用户 Repository
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id.0).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.username == username).cloned())
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::conflict("Username already taken"));
        }
        users.insert(user.id.0, user.clone());
        Ok(())
    }

    async fn record_login(&self, user_id: &UserId) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id.0)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.record_login();
        Ok(())
    }

    async fn set_refresh_token(
        &self,
        user_id: &UserId,
        record: Option<RefreshTokenRecord>,
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id.0)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        user.set_refresh_token(record);
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_id: &UserId,
        expected_fingerprint: &str,
        record: RefreshTokenRecord,
    ) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id.0)
            .ok_or_else(|| AppError::not_found("User not found"))?;

        match &user.refresh_token {
            Some(stored) if stored.fingerprint == expected_fingerprint => {
                user.set_refresh_token(Some(record));
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Email, HashedPassword};

    fn test_user(name: &str) -> User {
        User::new(
            Username::new(name).unwrap(),
            Email::new(format!("{}@example.com", name)).unwrap(),
            HashedPassword::from_plain("Test1234!").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("alice");
        repo.create(&user).await.unwrap();

        let by_id = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username.as_str(), "alice");

        let by_name = repo
            .find_by_username(&Username::new("alice").unwrap())
            .await
            .unwrap();
        assert!(by_name.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(&test_user("alice")).await.unwrap();
        let result = repo.create(&test_user("alice")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_swap_only_succeeds_on_matching_fingerprint() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("alice");
        repo.create(&user).await.unwrap();

        repo.set_refresh_token(&user.id, Some(RefreshTokenRecord::new("fp-1")))
            .await
            .unwrap();

        // 指纹不匹配：拒绝且不改动
        let missed = repo
            .swap_refresh_token(&user.id, "fp-0", RefreshTokenRecord::new("fp-2"))
            .await
            .unwrap();
        assert!(!missed);
        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.unwrap().fingerprint, "fp-1");

        // 指纹匹配：交换成功
        let swapped = repo
            .swap_refresh_token(&user.id, "fp-1", RefreshTokenRecord::new("fp-2"))
            .await
            .unwrap();
        assert!(swapped);

        // 同一旧指纹第二次交换失败
        let replay = repo
            .swap_refresh_token(&user.id, "fp-1", RefreshTokenRecord::new("fp-3"))
            .await
            .unwrap();
        assert!(!replay);
    }

    #[tokio::test]
    async fn test_swap_with_no_record_fails() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("alice");
        repo.create(&user).await.unwrap();

        let swapped = repo
            .swap_refresh_token(&user.id, "fp-1", RefreshTokenRecord::new("fp-2"))
            .await
            .unwrap();
        assert!(!swapped);
    }
}
