//! keygate-identity - 认证与会话令牌生命周期服务
//!
//! 凭据验证、密钥协商保护的凭据传输、令牌签发、刷新令牌轮换与撤销。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
