//! Public registration API
//!
//! The only gateway call that never carries a bearer token.

use crate::{ApiClient, ApiResult};
use shared::models::{CreateUserRequest, RegisterResponse};

impl ApiClient {
    /// Register a new account
    pub async fn register(&self, user: &CreateUserRequest) -> ApiResult<RegisterResponse> {
        self.post_public("api/auth/register", user).await
    }
}
