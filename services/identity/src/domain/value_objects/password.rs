//! Password 值对象
//!
//! Argon2id 哈希与验证。这里只做形状检查（非空、长度上限）——
//! 口令强度策略属于边界层的输入校验协作方，不在核心内。

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use keygate_errors::AppError;
use serde::{Deserialize, Serialize};

/// 口令最大长度（避免把超长输入喂给 KDF）
const MAX_PASSWORD_LENGTH: usize = 128;

/// 哈希后的密码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword(pub String);

impl HashedPassword {
    /// 从明文密码创建哈希密码
    pub fn from_plain(plain_password: &str) -> Result<Self, PasswordError> {
        if plain_password.is_empty() {
            return Err(PasswordError::Empty);
        }
        if plain_password.len() > MAX_PASSWORD_LENGTH {
            return Err(PasswordError::TooLong);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        Ok(Self(hash.to_string()))
    }

    /// 验证明文密码是否与哈希匹配
    ///
    /// Argon2 的 verify_password 在重算后做常数时间比较
    pub fn verify(&self, plain_password: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(&self.0).map_err(|e| PasswordError::Hash(e.to_string()))?;

        match Argon2::default().verify_password(plain_password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Hash(e.to_string())),
        }
    }
}

/// Password 错误
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Password is too long (maximum 128 characters)")]
    TooLong,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hash(msg) => AppError::internal(msg),
            other => AppError::validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = HashedPassword::from_plain("Test1234!").unwrap();
        assert!(hashed.verify("Test1234!").unwrap());
        assert!(!hashed.verify("WrongPassword!").unwrap());
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            HashedPassword::from_plain(""),
            Err(PasswordError::Empty)
        ));
    }

    #[test]
    fn test_oversized_password_rejected() {
        let long = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(matches!(
            HashedPassword::from_plain(&long),
            Err(PasswordError::TooLong)
        ));
    }

    #[test]
    fn test_same_password_different_salt() {
        let hash1 = HashedPassword::from_plain("Test1234!").unwrap();
        let hash2 = HashedPassword::from_plain("Test1234!").unwrap();
        // 盐不同，哈希也不同
        assert_ne!(hash1.0, hash2.0);
    }
}
