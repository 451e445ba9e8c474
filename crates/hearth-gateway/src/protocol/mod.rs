//! Wire protocol of the push channel

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{ChangePayload, ErrorPayload, HelloPayload, DEFAULT_HEARTBEAT_INTERVAL_MS};
