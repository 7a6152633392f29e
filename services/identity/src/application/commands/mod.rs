//! 认证命令定义

use keygate_common::UserId;
use keygate_cqrs_core::{Command, Query};

use crate::application::dto::{SessionView, UserView};

/// 注册命令
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl Command for RegisterCommand {
    type Result = ();
}

/// 登录载荷的加密信封（可选）
///
/// 存在时，`LoginCommand::password` 是待解密的 base64 密文
#[derive(Debug, Clone)]
pub struct EncryptedCredential {
    pub handshake_id: String,
    pub client_public_key: String,
}

/// 登录命令
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
    pub handshake: Option<EncryptedCredential>,
}

impl Command for LoginCommand {
    type Result = SessionView;
}

/// 刷新令牌轮换命令
#[derive(Debug, Clone)]
pub struct RefreshTokenCommand {
    pub refresh_token: String,
}

impl Command for RefreshTokenCommand {
    type Result = SessionView;
}

/// 登出命令
#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub user_id: UserId,
}

impl Command for LogoutCommand {
    type Result = ();
}

/// 用户档案查询
#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub user_id: UserId,
}

impl Query for GetProfileQuery {
    type Result = UserView;
}
