//! REST route definitions
//!
//! Queries go through GraphQL at /graphql. Only probes live here.

pub mod health;
