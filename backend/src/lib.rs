//! Cooking service backend
//!
//! Answers GraphQL queries about cookings (trips with flight and jump
//! reservations) from a SQLite database. The binary in `main.rs` wires
//! configuration, logging and the HTTP server around this library.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod graphql;
pub mod orm;
pub mod services;

pub use app::{AppState, build_app};
