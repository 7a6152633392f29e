//! 密码服务

use keygate_errors::AppResult;

use crate::domain::value_objects::HashedPassword;

/// 密码服务
pub struct PasswordService;

impl PasswordService {
    /// 哈希密码
    pub fn hash_password(password: &str) -> AppResult<HashedPassword> {
        HashedPassword::from_plain(password).map_err(Into::into)
    }

    /// 验证密码
    pub fn verify_password(password: &str, hash: &HashedPassword) -> AppResult<bool> {
        hash.verify(password).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hashed = PasswordService::hash_password("Test1234!").unwrap();
        assert!(PasswordService::verify_password("Test1234!", &hashed).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let hashed = PasswordService::hash_password("Test1234!").unwrap();
        assert!(!PasswordService::verify_password("nope", &hashed).unwrap());
    }

    #[test]
    fn test_hash_empty_password_fails() {
        assert!(PasswordService::hash_password("").is_err());
    }
}
