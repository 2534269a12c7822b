//! GraphQL API
//!
//! Read-only queries over cookings. Each domain gets a `queries/` file with a
//! `#[derive(Default)]` struct and an `#[Object]` impl, merged into
//! [`QueryRoot`](schema::QueryRoot) in `schema.rs`.

pub mod queries;
mod schema;
pub mod types;

pub use schema::{CookingSchema, QueryRoot, build_schema};
