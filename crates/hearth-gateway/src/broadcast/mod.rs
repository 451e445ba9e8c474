//! Redis to WebSocket fan-out

mod dispatcher;

pub use dispatcher::ChangeDispatcher;
