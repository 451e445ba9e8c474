//! Route handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod health;
pub mod mood_tags;
pub mod reactions;
pub mod rpc;
pub mod stories;
pub mod users;
