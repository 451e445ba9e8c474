//! # hearth-gateway
//!
//! WebSocket push channel. Clients subscribe to change topics and receive
//! CHANGE frames relayed from Redis pub/sub.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, GatewayState};
