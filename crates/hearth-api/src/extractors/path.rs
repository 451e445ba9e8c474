//! Path parameter extractors
//!
//! Snowflake ids and reaction kinds parsed from the URL, reported as
//! `INVALID_PATH_PARAMETER` when malformed.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use hearth_core::{ReactionKind, Snowflake};
use serde::Deserialize;

use crate::response::ApiError;

/// A single Snowflake path segment, whatever its name.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        raw.parse()
            .map(IdPath)
            .map_err(|_| ApiError::invalid_path(format!("Invalid id: {raw}")))
    }
}

#[derive(Debug, Deserialize)]
struct RawReactionPath {
    story_id: String,
    kind: String,
}

/// `/stories/:story_id/reactions/:kind/@me`
#[derive(Debug, Clone, Copy)]
pub struct ReactionPath {
    pub story_id: Snowflake,
    pub kind: ReactionKind,
}

#[async_trait]
impl<S> FromRequestParts<S> for ReactionPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RawReactionPath>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        let story_id = raw
            .story_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid story_id format"))?;
        let kind = raw.kind.parse()?;

        Ok(ReactionPath { story_id, kind })
    }
}
