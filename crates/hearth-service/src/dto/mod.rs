//! Data transfer objects for API requests and responses

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AnalyticsQuery, AssignRoleRequest, ChatMessageInput, ChatRequest, CreateMoodTagRequest,
    CreateStoryRequest, FeedQuery, MatchStoriesByMoodsRequest, RecordEventRequest,
    RefreshTokenRequest, SignInRequest, SignOutRequest, SignUpRequest, UpdateMeRequest,
    UpdateMoodTagRequest, UpdateStoryRequest,
};

pub use responses::{
    AuthResponse, ChatResponse, HealthChecks, HealthResponse, MatchStoriesResponse,
    ModerationEntryResponse, MoodTagResponse, PageResponse, ReactionResponse,
    ReactionSummaryResponse, ReadinessResponse, RoleResponse, StoryResponse, UserResponse,
    ViewCountResponse,
};
