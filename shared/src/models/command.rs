//! Command (order) Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
///
/// Transitions are server-authoritative; the client only requests them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl CommandStatus {
    /// Every status the gateway accepts, in lifecycle order
    pub const ALL: [CommandStatus; 6] = [
        CommandStatus::Pending,
        CommandStatus::Confirmed,
        CommandStatus::Processing,
        CommandStatus::Shipped,
        CommandStatus::Delivered,
        CommandStatus::Cancelled,
    ];

    /// Wire name (SCREAMING_SNAKE_CASE), used in the status query filter
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "PENDING",
            CommandStatus::Confirmed => "CONFIRMED",
            CommandStatus::Processing => "PROCESSING",
            CommandStatus::Shipped => "SHIPPED",
            CommandStatus::Delivered => "DELIVERED",
            CommandStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, thiserror::Error)]
#[error("unknown command status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for CommandStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Order line item with unit price snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandItem {
    pub product_id: u64,
    pub quantity: u32,
    /// Unit price at order time (JSON number on the wire)
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub command_id: u64,
    /// Creation timestamp as reported by the gateway
    pub date: String,
    pub status: CommandStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub user_id: String,
    pub username: String,
    pub items: Vec<CommandItem>,
}

/// Order line in a create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandItemRequest {
    pub product_id: u64,
    pub quantity: u32,
}

/// Create/update order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub items: Vec<CommandItemRequest>,
}

/// Status transition request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandStatusUpdate {
    pub status: CommandStatus,
}
