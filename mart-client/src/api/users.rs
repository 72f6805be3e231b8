//! User administration API

use crate::{ApiClient, ApiResult};
use shared::models::{CreateUserRequest, EnabledUpdate, UpdateUserRequest, User};

impl ApiClient {
    /// List all users (admin)
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get("api/users").await
    }

    /// Fetch a single user (admin)
    pub async fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.get(&format!("api/users/{user_id}")).await
    }

    /// Create a user (admin)
    pub async fn create_user(&self, user: &CreateUserRequest) -> ApiResult<User> {
        self.post("api/users", user).await
    }

    /// Update a user (admin)
    pub async fn update_user(&self, user_id: &str, user: &UpdateUserRequest) -> ApiResult<User> {
        self.put(&format!("api/users/{user_id}"), user).await
    }

    /// Delete a user (admin)
    pub async fn delete_user(&self, user_id: &str) -> ApiResult<()> {
        self.delete(&format!("api/users/{user_id}")).await
    }

    /// Toggle the enabled flag (admin)
    pub async fn set_user_enabled(&self, user_id: &str, enabled: bool) -> ApiResult<User> {
        self.patch(
            &format!("api/users/{user_id}/enabled"),
            &EnabledUpdate { enabled },
        )
        .await
    }
}
