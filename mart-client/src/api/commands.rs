//! Command (order) API
//!
//! Status transitions are requested here but decided by the server. Delete
//! and cancel are distinct: delete removes the record, cancel moves it to
//! CANCELLED and keeps the history.

use crate::{ApiClient, ApiResult};
use shared::models::{Command, CommandRequest, CommandStatus, CommandStatusUpdate};

impl ApiClient {
    /// List orders, optionally filtered by status
    pub async fn list_commands(&self, status: Option<CommandStatus>) -> ApiResult<Vec<Command>> {
        let path = match status {
            Some(status) => format!("api/commands?status={status}"),
            None => "api/commands".to_string(),
        };
        self.get(&path).await
    }

    /// Fetch a single order
    pub async fn get_command(&self, command_id: u64) -> ApiResult<Command> {
        self.get(&format!("api/commands/{command_id}")).await
    }

    /// Create an order from line items; it starts in PENDING
    pub async fn create_command(&self, command: &CommandRequest) -> ApiResult<Command> {
        self.post("api/commands", command).await
    }

    /// Replace an order's line items (admin)
    pub async fn update_command(
        &self,
        command_id: u64,
        command: &CommandRequest,
    ) -> ApiResult<Command> {
        self.put(&format!("api/commands/{command_id}"), command).await
    }

    /// Delete an order record (admin)
    pub async fn delete_command(&self, command_id: u64) -> ApiResult<()> {
        self.delete(&format!("api/commands/{command_id}")).await
    }

    /// Request a status transition (admin)
    pub async fn update_command_status(
        &self,
        command_id: u64,
        status: CommandStatus,
    ) -> ApiResult<Command> {
        self.patch(
            &format!("api/commands/{command_id}/status"),
            &CommandStatusUpdate { status },
        )
        .await
    }

    /// Cancel an order, preserving its history
    pub async fn cancel_command(&self, command_id: u64) -> ApiResult<()> {
        self.post_empty(&format!("api/commands/{command_id}/cancel")).await
    }
}
