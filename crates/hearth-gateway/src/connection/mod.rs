//! Connection tracking

mod connection;
mod manager;

pub use connection::Connection;
pub use manager::{ConnectionManager, SubscribeOutcome};
