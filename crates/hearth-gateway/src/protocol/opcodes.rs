//! Push channel operation codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Frame type carried in the `op` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Rows of a subscribed topic changed (server only)
    Change = 0,
    /// Keep-alive (client only)
    Heartbeat = 1,
    /// Start listening to a topic (client only)
    Subscribe = 2,
    /// Stop listening to a topic (client only)
    Unsubscribe = 3,
    /// Request could not be honoured; the connection stays open (server only)
    Error = 9,
    /// First frame after connect, carries the heartbeat interval (server only)
    Hello = 10,
    /// Heartbeat acknowledged (server only)
    HeartbeatAck = 11,
}

impl OpCode {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Change),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Subscribe),
            3 => Some(Self::Unsubscribe),
            9 => Some(Self::Error),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(self, Self::Heartbeat | Self::Subscribe | Self::Unsubscribe)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Change => "Change",
            Self::Heartbeat => "Heartbeat",
            Self::Subscribe => "Subscribe",
            Self::Unsubscribe => "Unsubscribe",
            Self::Error => "Error",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
