//! Shared types for the TrustMart storefront
//!
//! Data model types and API DTOs used by both the API client crate and the
//! console. Field names follow the gateway's JSON contract (camelCase).

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Command, CommandItem, CommandItemRequest, CommandRequest, CommandStatus,
    CommandStatusUpdate, CreateUserRequest, EnabledUpdate, ParseStatusError, Product,
    ProductRequest, RegisterResponse, StockUpdate, UpdateUserRequest, User,
};
