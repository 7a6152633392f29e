//! 用户 Repository trait
//!
//! 用户档案的存储由外部协作方提供；核心只依赖这里定义的端口。
//! 会话状态的写入必须是原子的：`swap_refresh_token` 是轮换的
//! 串行化点，两个并发轮换不允许都成功。

use async_trait::async_trait;
use keygate_common::UserId;
use keygate_errors::AppResult;

use crate::domain::entities::{RefreshTokenRecord, User};
use crate::domain::value_objects::Username;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &Username) -> AppResult<Option<User>>;

    /// 创建用户（用户名重复返回 Conflict）
    async fn create(&self, user: &User) -> AppResult<()>;

    /// 记录一次成功登录
    async fn record_login(&self, user_id: &UserId) -> AppResult<()>;

    /// 覆盖写刷新令牌记录（登录、登出）
    async fn set_refresh_token(
        &self,
        user_id: &UserId,
        record: Option<RefreshTokenRecord>,
    ) -> AppResult<()>;

    /// 比较并交换刷新令牌记录（轮换）
    ///
    /// 仅当存储的指纹仍等于 `expected_fingerprint` 时写入新记录并
    /// 返回 true；否则不做任何修改返回 false。
    async fn swap_refresh_token(
        &self,
        user_id: &UserId,
        expected_fingerprint: &str,
        record: RefreshTokenRecord,
    ) -> AppResult<bool>;
}
