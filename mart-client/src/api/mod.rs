//! Typed gateway endpoints
//!
//! One module per resource, matching the gateway's route groups. All
//! methods live on [`ApiClient`](crate::ApiClient).

pub mod commands;
pub mod products;
pub mod register;
pub mod users;
