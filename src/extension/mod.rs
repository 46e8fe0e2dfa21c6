//! Messaging-extension surface: activity/response types, the query
//! dispatcher, and the stdio transport.

pub mod handlers;
pub mod protocol;
pub mod server;
