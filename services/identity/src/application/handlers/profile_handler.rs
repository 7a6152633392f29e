//! 用户档案查询处理器

use std::sync::Arc;

use async_trait::async_trait;
use keygate_cqrs_core::QueryHandler;
use keygate_errors::{AppError, AppResult};

use crate::application::commands::GetProfileQuery;
use crate::application::dto::UserView;
use crate::domain::repositories::UserRepository;

pub struct GetProfileHandler {
    user_repo: Arc<dyn UserRepository>,
}

impl GetProfileHandler {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl QueryHandler<GetProfileQuery> for GetProfileHandler {
    async fn handle(&self, query: GetProfileQuery) -> AppResult<UserView> {
        let user = self
            .user_repo
            .find_by_id(&query.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(UserView::from(&user))
    }
}
