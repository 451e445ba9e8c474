//! Model to entity mappers
//!
//! Columns holding enumerations or validated names convert with `TryFrom`;
//! a value the domain rejects is reported as a database error.

mod mood_tag;
mod reaction;
mod role;
mod story;
mod user;
