//! # hearth-service
//!
//! Application layer: stories, reactions, mood tags, roles, analytics and
//! the chat proxy, plus the request and response DTOs the API serves.

pub mod chat;
pub mod dto;
pub mod services;

pub use chat::{ChatError, ChatRole, ChatTurn, HttpLanguageModel, LanguageModel};
pub use services::{
    AnalyticsService, AuthService, ChatService, MoodTagService, ReactionService, RoleService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, StoryService, UserService,
};
