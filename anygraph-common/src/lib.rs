//! Shared domain types for the AnyGraph analysis backend.
//!
//! Everything a collaborator needs to hand work to the execution core:
//! dataset schemas and prior conversation turns. Persistence of users,
//! sessions and datasets lives outside this workspace; these types are the
//! contract at that boundary.

pub mod chat;
pub mod schema;

pub use chat::*;
pub use schema::*;
