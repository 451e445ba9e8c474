//! Gateway frame format `{"op": <u8>, "d": <payload>}`

use hearth_core::{ChangeTopic, DomainError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChangePayload, ErrorPayload, HelloPayload, OpCode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: OpCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    fn with_payload(op: OpCode, payload: &impl Serialize) -> Self {
        Self {
            op,
            d: serde_json::to_value(payload).ok(),
        }
    }

    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self::with_payload(OpCode::Hello, &payload)
    }

    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self {
            op: OpCode::HeartbeatAck,
            d: None,
        }
    }

    #[must_use]
    pub fn change(payload: &ChangePayload) -> Self {
        Self::with_payload(OpCode::Change, payload)
    }

    #[must_use]
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::with_payload(OpCode::Error, &ErrorPayload::new(code, message))
    }

    /// ERROR answering a SUBSCRIBE, echoing the topic so clients can drop
    /// their routes for it.
    #[must_use]
    pub fn subscribe_error(
        topic: Option<ChangeTopic>,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::with_payload(
            OpCode::Error,
            &ErrorPayload::new(code, message).for_topic(topic),
        )
    }

    /// Topic as sent, before validation.
    pub fn raw_topic(&self) -> Option<ChangeTopic> {
        self.d
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Topic carried by a SUBSCRIBE or UNSUBSCRIBE frame, validated.
    pub fn as_topic(&self) -> Result<ChangeTopic, DomainError> {
        let value = self
            .d
            .clone()
            .ok_or_else(|| DomainError::InvalidFilter("missing topic".to_string()))?;
        let topic: ChangeTopic = serde_json::from_value(value)
            .map_err(|e| DomainError::InvalidFilter(e.to_string()))?;
        topic.validate()?;
        Ok(topic)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{ChangeNotice, ChangeOp, Snowflake, WatchedTable};

    #[test]
    fn hello_frame_shape() {
        let json = GatewayMessage::hello(HelloPayload::with_interval(15_000))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"op":10,"d":{"heartbeat_interval":15000}}"#);
    }

    #[test]
    fn heartbeat_ack_has_no_payload() {
        assert_eq!(GatewayMessage::heartbeat_ack().to_json().unwrap(), r#"{"op":11}"#);
    }

    #[test]
    fn change_frame_flattens_notice() {
        let topic = ChangeTopic::story_reactions(Snowflake::new(9));
        let notice =
            ChangeNotice::new(WatchedTable::Reactions, ChangeOp::Delete).with_key("story_id", 9);
        let msg = GatewayMessage::change(&ChangePayload { topic, notice });

        let d = msg.d.unwrap();
        assert_eq!(d["table"], "reactions");
        assert_eq!(d["op"], "DELETE");
        assert_eq!(d["key"]["story_id"], "9");
        assert_eq!(d["topic"]["filter"]["column"], "story_id");
    }

    #[test]
    fn subscribe_payload_parses_into_topic() {
        let msg = GatewayMessage::from_json(
            r#"{"op":2,"d":{"table":"reactions","filter":{"column":"story_id","value":"9"}}}"#,
        )
        .unwrap();
        assert_eq!(
            msg.as_topic().unwrap(),
            ChangeTopic::story_reactions(Snowflake::new(9))
        );

        let table_wide =
            GatewayMessage::from_json(r#"{"op":2,"d":{"table":"stories","filter":null}}"#).unwrap();
        assert_eq!(
            table_wide.as_topic().unwrap(),
            ChangeTopic::table(WatchedTable::Stories)
        );
    }

    #[test]
    fn subscribe_rejects_unpublished_columns() {
        let msg = GatewayMessage::from_json(
            r#"{"op":2,"d":{"table":"reactions","filter":{"column":"user_id","value":"1"}}}"#,
        )
        .unwrap();
        assert!(msg.as_topic().is_err());

        let empty = GatewayMessage::from_json(r#"{"op":2}"#).unwrap();
        assert!(empty.as_topic().is_err());
    }

    #[test]
    fn subscribe_error_echoes_topic() {
        let topic = ChangeTopic::story_reactions(Snowflake::new(4));
        let msg = GatewayMessage::subscribe_error(Some(topic), "SUBSCRIBE_FAILED", "unavailable");
        let d = msg.d.unwrap();
        assert_eq!(d["code"], "SUBSCRIBE_FAILED");
        assert_eq!(d["topic"]["filter"]["value"], "4");

        let plain = GatewayMessage::error("INVALID_FILTER", "bad").d.unwrap();
        assert!(plain.get("topic").is_none());
    }
}
