//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, migrations_dir, run_migrations, PoolSettings};

pub use sqlx::postgres::PgPool;
