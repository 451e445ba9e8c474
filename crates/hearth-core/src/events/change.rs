//! Change notifications for the push channel.
//!
//! A notice only says that rows of a table changed, optionally with the key
//! columns of the row. Subscribers refetch; they never read data from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

const CHANNEL_PREFIX: &str = "changes";

/// Tables that can be watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedTable {
    Stories,
    Reactions,
    MoodTags,
    UserRoles,
}

impl WatchedTable {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stories => "stories",
            Self::Reactions => "reactions",
            Self::MoodTags => "mood_tags",
            Self::UserRoles => "user_roles",
        }
    }

    /// Columns a subscription may filter on.
    pub const fn filter_columns(self) -> &'static [&'static str] {
        match self {
            Self::Stories => &["id"],
            Self::Reactions => &["story_id"],
            Self::MoodTags => &["id"],
            Self::UserRoles => &["user_id"],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stories" => Some(Self::Stories),
            "reactions" => Some(Self::Reactions),
            "mood_tags" => Some(Self::MoodTags),
            "user_roles" => Some(Self::UserRoles),
            _ => None,
        }
    }
}

impl fmt::Display for WatchedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

/// What a subscriber listens to: a whole table or the rows matching a filter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeTopic {
    pub table: WatchedTable,
    #[serde(default)]
    pub filter: Option<RowFilter>,
}

impl ChangeTopic {
    pub fn table(table: WatchedTable) -> Self {
        Self {
            table,
            filter: None,
        }
    }

    pub fn filtered(
        table: WatchedTable,
        column: &str,
        value: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let topic = Self {
            table,
            filter: Some(RowFilter {
                column: column.to_string(),
                value: value.into(),
            }),
        };
        topic.validate()?;
        Ok(topic)
    }

    /// Reactions of one story.
    pub fn story_reactions(story_id: Snowflake) -> Self {
        Self {
            table: WatchedTable::Reactions,
            filter: Some(RowFilter {
                column: "story_id".to_string(),
                value: story_id.to_string(),
            }),
        }
    }

    /// Rejects filters on columns the table does not publish.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(filter) = &self.filter {
            let allowed = self.table.filter_columns().contains(&filter.column.as_str());
            let clean_value = !filter.value.is_empty()
                && !filter.value.contains(':')
                && !filter.value.contains('=');
            if !allowed || !clean_value {
                return Err(DomainError::InvalidFilter(format!(
                    "{}.{}={}",
                    self.table, filter.column, filter.value
                )));
            }
        }
        Ok(())
    }

    /// Pub/sub channel name, e.g. `changes:reactions:story_id=42`.
    pub fn channel_name(&self) -> String {
        match &self.filter {
            None => format!("{CHANNEL_PREFIX}:{}", self.table),
            Some(f) => format!("{CHANNEL_PREFIX}:{}:{}={}", self.table, f.column, f.value),
        }
    }

    pub fn parse_channel(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(CHANNEL_PREFIX)?.strip_prefix(':')?;
        match rest.split_once(':') {
            None => Some(Self::table(WatchedTable::parse(rest)?)),
            Some((table, filter)) => {
                let (column, value) = filter.split_once('=')?;
                Self::filtered(WatchedTable::parse(table)?, column, value).ok()
            }
        }
    }

    pub fn matches(&self, notice: &ChangeNotice) -> bool {
        self.table == notice.table
            && self
                .filter
                .as_ref()
                .map_or(true, |f| notice.key_value(&f.column) == Some(f.value.as_str()))
    }
}

impl fmt::Display for ChangeTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.channel_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// "Something changed, refetch."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub table: WatchedTable,
    pub op: ChangeOp,
    #[serde(default)]
    pub key: BTreeMap<String, String>,
}

impl ChangeNotice {
    pub fn new(table: WatchedTable, op: ChangeOp) -> Self {
        Self {
            table,
            op,
            key: BTreeMap::new(),
        }
    }

    pub fn with_key(mut self, column: &str, value: impl ToString) -> Self {
        self.key.insert(column.to_string(), value.to_string());
        self
    }

    pub fn key_value(&self, column: &str) -> Option<&str> {
        self.key.get(column).map(String::as_str)
    }

    /// Every topic a subscriber could hold that this notice satisfies.
    pub fn topics(&self) -> Vec<ChangeTopic> {
        let mut topics = vec![ChangeTopic::table(self.table)];
        for column in self.table.filter_columns() {
            if let Some(value) = self.key_value(column) {
                topics.push(ChangeTopic {
                    table: self.table,
                    filter: Some(RowFilter {
                        column: (*column).to_string(),
                        value: value.to_string(),
                    }),
                });
            }
        }
        topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_round_trip() {
        let topic = ChangeTopic::story_reactions(Snowflake::new(42));
        assert_eq!(topic.channel_name(), "changes:reactions:story_id=42");
        assert_eq!(ChangeTopic::parse_channel(&topic.channel_name()), Some(topic));

        let table = ChangeTopic::table(WatchedTable::MoodTags);
        assert_eq!(table.channel_name(), "changes:mood_tags");
        assert_eq!(ChangeTopic::parse_channel("changes:mood_tags"), Some(table));
        assert_eq!(ChangeTopic::parse_channel("guild:1"), None);
    }

    #[test]
    fn rejects_unpublished_columns() {
        assert!(ChangeTopic::filtered(WatchedTable::Reactions, "user_id", "1").is_err());
        assert!(ChangeTopic::filtered(WatchedTable::Reactions, "story_id", "1:2").is_err());
        assert!(ChangeTopic::filtered(WatchedTable::Reactions, "story_id", "7").is_ok());
    }

    #[test]
    fn notice_fans_out_to_table_and_filtered_topics() {
        let notice = ChangeNotice::new(WatchedTable::Reactions, ChangeOp::Insert)
            .with_key("story_id", 7)
            .with_key("user_id", 9);
        let topics = notice.topics();
        assert_eq!(topics.len(), 2);
        assert!(topics.iter().all(|t| t.matches(&notice)));
        assert!(!ChangeTopic::story_reactions(Snowflake::new(8)).matches(&notice));
    }

    #[test]
    fn notice_without_key_only_matches_table_topic() {
        let notice = ChangeNotice::new(WatchedTable::Reactions, ChangeOp::Delete);
        assert!(ChangeTopic::table(WatchedTable::Reactions).matches(&notice));
        assert!(!ChangeTopic::story_reactions(Snowflake::new(1)).matches(&notice));
    }

    #[test]
    fn notice_json_shape() {
        let notice = ChangeNotice::new(WatchedTable::Stories, ChangeOp::Update).with_key("id", 3);
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["table"], "stories");
        assert_eq!(json["op"], "UPDATE");
        assert_eq!(json["key"]["id"], "3");
    }
}
