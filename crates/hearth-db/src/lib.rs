//! # hearth-db
//!
//! PostgreSQL implementations of the repository traits in `hearth-core`,
//! built on SQLx with runtime-checked queries.
//!
//! - Connection pool and embedded migrations
//! - Row models with `FromRow` derives
//! - Model to entity mappers
//! - Repository implementations
//!
//! ```rust,ignore
//! use hearth_db::{create_pool, migrations_dir, run_migrations, PoolSettings, PgStoryRepository};
//!
//! let pool = create_pool(&PoolSettings::from(&config.database)).await?;
//! run_migrations(&pool, migrations_dir()).await?;
//! let stories = PgStoryRepository::new(pool);
//! ```

mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, migrations_dir, run_migrations, PgPool, PoolSettings};
pub use repositories::{
    PgAnalyticsRepository, PgMoodTagRepository, PgReactionRepository, PgRoleRepository,
    PgStoryRepository, PgUserRepository,
};
