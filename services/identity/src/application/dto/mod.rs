//! 应用层 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::User;

/// 令牌对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// 用户的公开投影
///
/// 对外响应只经过这个类型构造，存储实体不做就地字段剥离
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            display_name: user.display_name.clone(),
            created_at: user.audit_info.created_at,
        }
    }
}

/// 登录/刷新的结果：公开用户字段 + 新令牌对
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub user: UserView,
    pub token: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Email, HashedPassword, Username};

    #[test]
    fn test_user_view_carries_no_secrets() {
        let user = User::new(
            Username::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            HashedPassword::from_plain("Test1234!").unwrap(),
        );
        let view = UserView::from(&user);
        let json = serde_json::to_string(&view).unwrap();

        assert!(json.contains("alice@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("refresh"));
    }
}
