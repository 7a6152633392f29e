//! keygate-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范。
//!
//! 认证类错误对外统一呈现为 "Unauthorized"，不暴露具体是哪一步
//! 校验失败；内部仍按类别区分（审计、告警用）。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 用户名不存在或密码错误（对外不可区分，防止用户名枚举）
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 握手 ID 未知或超出协商时限
    #[error("Handshake expired")]
    HandshakeExpired,

    /// 同一握手 ID 的密钥材料已被消费
    #[error("Handshake already consumed")]
    HandshakeAlreadyConsumed,

    /// 令牌超过有效期
    #[error("Token expired")]
    TokenExpired,

    /// 令牌签名或结构无效
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    /// 刷新令牌与存储指纹不符（疑似被盗用后重放）
    #[error("Refresh token reused")]
    TokenReused,

    /// 用户没有活跃会话
    #[error("User is not logged in")]
    NotLoggedIn,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn token_invalid(msg: impl Into<String>) -> Self {
        Self::TokenInvalid(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 是否属于认证类错误（对外呈现必须不可区分）
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::HandshakeExpired
                | Self::HandshakeAlreadyConsumed
                | Self::TokenExpired
                | Self::TokenInvalid(_)
                | Self::TokenReused
                | Self::NotLoggedIn
                | Self::Unauthenticated(_)
        )
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials
            | Self::HandshakeExpired
            | Self::HandshakeAlreadyConsumed
            | Self::TokenExpired
            | Self::TokenInvalid(_)
            | Self::TokenReused
            | Self::NotLoggedIn
            | Self::Unauthenticated(_) => 401,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// 转换为 Problem Details（对外视图）
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: self.problem_type(),
            title: self.problem_title(),
            status: self.status_code(),
            detail: self.public_detail(),
            instance: None,
        }
    }

    /// 对外 detail：认证类错误一律只给类别标题
    fn public_detail(&self) -> String {
        if self.is_auth_failure() {
            self.problem_title()
        } else {
            self.to_string()
        }
    }

    fn problem_type(&self) -> String {
        let slug = match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not-found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
            _ => "unauthorized",
        };
        format!("https://api.keygate.io/problems/{}", slug)
    }

    fn problem_title(&self) -> String {
        match self {
            Self::Validation(_) => "Validation Error".to_string(),
            Self::NotFound(_) => "Resource Not Found".to_string(),
            Self::Conflict(_) => "Conflict".to_string(),
            Self::Internal(_) => "Internal Server Error".to_string(),
            _ => "Unauthorized".to_string(),
        }
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_map_to_401() {
        for err in [
            AppError::InvalidCredentials,
            AppError::HandshakeExpired,
            AppError::HandshakeAlreadyConsumed,
            AppError::TokenExpired,
            AppError::token_invalid("bad signature"),
            AppError::TokenReused,
            AppError::NotLoggedIn,
            AppError::unauthenticated("no record"),
        ] {
            assert_eq!(err.status_code(), 401);
            assert!(err.is_auth_failure());
        }
    }

    #[test]
    fn test_auth_failures_are_externally_indistinguishable() {
        let reused = AppError::TokenReused.to_problem_details();
        let invalid = AppError::token_invalid("signature mismatch").to_problem_details();
        let credentials = AppError::InvalidCredentials.to_problem_details();

        assert_eq!(reused.detail, invalid.detail);
        assert_eq!(reused.detail, credentials.detail);
        assert_eq!(reused.r#type, invalid.r#type);
        // 内部原因不允许出现在对外 detail 中
        assert!(!invalid.detail.contains("signature"));
    }

    #[test]
    fn test_non_auth_errors_keep_detail() {
        let err = AppError::conflict("username already taken");
        let problem = err.to_problem_details();
        assert_eq!(problem.status, 409);
        assert!(problem.detail.contains("username already taken"));
    }
}
