//! Reaction entity and the per-story tally derived from reaction rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::value_objects::{ReactionKind, Snowflake};

/// A `(story, user, kind)` row. Unique per triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub story_id: Snowflake,
    pub user_id: Snowflake,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(story_id: Snowflake, user_id: Snowflake, kind: ReactionKind) -> Self {
        Self {
            story_id,
            user_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Count for one kind, with whether the viewer holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub kind: ReactionKind,
    pub count: u64,
    pub me: bool,
}

/// Counts per kind plus the kinds held by one viewer.
///
/// Every kind is always present in `counts`, zero when nobody used it.
/// Built from full row sets, never adjusted incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    counts: BTreeMap<ReactionKind, u64>,
    active: BTreeSet<ReactionKind>,
}

impl Default for ReactionTally {
    fn default() -> Self {
        Self::empty()
    }
}

impl ReactionTally {
    pub fn empty() -> Self {
        Self {
            counts: ReactionKind::ALL.into_iter().map(|k| (k, 0)).collect(),
            active: BTreeSet::new(),
        }
    }

    /// `all` yields one kind per reaction row of the story, `mine` the
    /// kinds of the viewer's rows.
    pub fn from_kinds(
        all: impl IntoIterator<Item = ReactionKind>,
        mine: impl IntoIterator<Item = ReactionKind>,
    ) -> Self {
        let mut tally = Self::empty();
        for kind in all {
            *tally.counts.entry(kind).or_insert(0) += 1;
        }
        tally.active.extend(mine);
        tally
    }

    /// From per-kind counts as aggregated by the store. Negative counts are
    /// read as zero; repeated kinds add up.
    pub fn from_counts(
        counts: impl IntoIterator<Item = (ReactionKind, i64)>,
        mine: impl IntoIterator<Item = ReactionKind>,
    ) -> Self {
        let mut tally = Self::empty();
        for (kind, count) in counts {
            *tally.counts.entry(kind).or_insert(0) += u64::try_from(count).unwrap_or(0);
        }
        tally.active.extend(mine);
        tally
    }

    pub fn from_reactions(all: &[Reaction], viewer: Option<Snowflake>) -> Self {
        Self::from_kinds(
            all.iter().map(|r| r.kind),
            all.iter()
                .filter(|r| Some(r.user_id) == viewer)
                .map(|r| r.kind),
        )
    }

    pub fn count(&self, kind: ReactionKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_active(&self, kind: ReactionKind) -> bool {
        self.active.contains(&kind)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn active(&self) -> &BTreeSet<ReactionKind> {
        &self.active
    }

    pub fn counts(&self) -> Vec<ReactionCount> {
        self.counts
            .iter()
            .map(|(&kind, &count)| ReactionCount {
                kind,
                count,
                me: self.is_active(kind),
            })
            .collect()
    }
}
