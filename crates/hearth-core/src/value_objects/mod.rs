//! Value objects - immutable types that represent domain concepts

mod reaction_kind;
mod role_name;
mod snowflake;

pub use reaction_kind::ReactionKind;
pub use role_name::RoleName;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
