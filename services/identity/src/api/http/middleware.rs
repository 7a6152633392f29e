//! HTTP 认证中间件

use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use keygate_auth_core::Claims;
use tracing::{debug, warn};

use super::error::ApiError;
use super::AppState;

/// 认证 Claims 提取器
///
/// 用于从请求中获取已验证的 Claims，应在 auth_middleware 之后使用
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing claims in request extensions (auth_middleware may not have run)",
            ))
    }
}

/// 访问令牌认证中间件
///
/// 无状态校验 Bearer token（签名 + 过期），把 claims 注入请求扩展。
/// 守卫失败即终止，重试策略属于客户端。
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("missing or malformed authorization header");
        return Err(ApiError(keygate_errors::AppError::unauthenticated(
            "Missing bearer token",
        )));
    };

    let claims = state.guard.authenticate_access(token).map_err(|e| {
        warn!(error = %e, "access token rejected");
        ApiError(e)
    })?;

    debug!(user_id = %claims.sub, "access token validated");

    let mut request = request;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
