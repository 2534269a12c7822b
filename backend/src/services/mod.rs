//! Domain services

pub mod cookings;

pub use cookings::{CookingService, CookingStore, StoreError};
