//! The fixed set of reactions a reader can leave on a story.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// One of the six reaction kinds.
///
/// Ordering follows declaration order, which is also the display order used
/// by reaction bars and aggregate maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Heart,
    Support,
    Strength,
    Hope,
    Grateful,
    Empathy,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        ReactionKind::Heart,
        ReactionKind::Support,
        ReactionKind::Strength,
        ReactionKind::Hope,
        ReactionKind::Grateful,
        ReactionKind::Empathy,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Support => "support",
            Self::Strength => "strength",
            Self::Hope => "hope",
            Self::Grateful => "grateful",
            Self::Empathy => "empathy",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownReactionKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_case_insensitively() {
        for kind in ReactionKind::ALL {
            assert_eq!(kind.as_str().parse::<ReactionKind>().unwrap(), kind);
            assert_eq!(
                kind.as_str().to_uppercase().parse::<ReactionKind>().unwrap(),
                kind
            );
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "laugh".parse::<ReactionKind>().unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_REACTION_KIND");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReactionKind::Grateful).unwrap(),
            "\"grateful\""
        );
    }
}
