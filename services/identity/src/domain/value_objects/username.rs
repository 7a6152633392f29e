//! Username 值对象

use keygate_errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Username 值对象
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(pub String);

impl Username {
    /// 创建新的 Username
    pub fn new(username: impl Into<String>) -> Result<Self, UsernameError> {
        let username = username.into();

        Self::validate(&username)?;

        Ok(Self(username))
    }

    /// 验证用户名格式
    fn validate(username: &str) -> Result<(), UsernameError> {
        if username.len() < 3 {
            return Err(UsernameError::TooShort);
        }

        if username.len() > 32 {
            return Err(UsernameError::TooLong);
        }

        // 只允许字母、数字、下划线、连字符，且以字母或数字开头
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(UsernameError::InvalidCharacters);
        }

        if let Some(first) = username.chars().next() {
            if !first.is_alphanumeric() {
                return Err(UsernameError::InvalidStart);
            }
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username 错误
#[derive(Debug, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is too short (minimum 3 characters)")]
    TooShort,

    #[error("Username is too long (maximum 32 characters)")]
    TooLong,

    #[error("Username contains invalid characters")]
    InvalidCharacters,

    #[error("Username must start with an alphanumeric character")]
    InvalidStart,
}

impl From<UsernameError> for AppError {
    fn from(err: UsernameError) -> Self {
        AppError::validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        let username = Username::new("alice-01");
        assert!(username.is_ok());
        assert_eq!(username.unwrap().as_str(), "alice-01");
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(Username::new("ab"), Err(UsernameError::TooShort)));
    }

    #[test]
    fn test_too_long() {
        let long = "a".repeat(33);
        assert!(matches!(Username::new(long), Err(UsernameError::TooLong)));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            Username::new("alice!"),
            Err(UsernameError::InvalidCharacters)
        ));
    }

    #[test]
    fn test_invalid_start() {
        assert!(matches!(
            Username::new("_alice"),
            Err(UsernameError::InvalidStart)
        ));
    }
}
