//! Data models
//!
//! Mirrors the gateway's OpenAPI types. These are wire types: the gateway
//! owns the records, the client only renders and mutates them.

pub mod command;
pub mod product;
pub mod user;

// Re-exports
pub use command::*;
pub use product::*;
pub use user::*;
