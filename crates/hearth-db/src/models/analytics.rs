//! Analytics aggregate models

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct EventTypeCountModel {
    pub event_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct StoryCountsModel {
    pub total: i64,
    pub public: i64,
}
