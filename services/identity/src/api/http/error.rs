//! HTTP 错误映射
//!
//! AppError -> RFC 7807 响应。认证类错误对外统一 401 "Unauthorized"，
//! 不泄露是哪一步校验失败；内部类别只进日志和指标。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keygate_errors::AppError;
use tracing::{debug, error};

pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        if err.status_code() >= 500 {
            error!(error = %err, "request failed");
        } else {
            debug!(error = %err, "request rejected");
        }

        let problem = err.to_problem_details();
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(problem)).into_response()
    }
}
