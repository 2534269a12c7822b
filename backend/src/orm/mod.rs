//! ORM Layer
//!
//! Provides a persistence-agnostic predicate tree plus the traits and query
//! builder that turn it into parameterized SQLite queries:
//! - [`Predicate`]: `And`/`Or`/`Compare` expressions over named fields
//! - [`DatabaseEntity`] / [`FromSqlRow`]: table metadata and row decoding
//! - [`EntityQuery`]: SELECT/COUNT with filters, ordering and limits
//!
//! ```rust,ignore
//! use crate::orm::{EntityQuery, Predicate};
//!
//! let live = Predicate::and([
//!     Predicate::is_null("stale_at"),
//!     Predicate::eq("owner_user_id", 7i64),
//! ]);
//! let rows = EntityQuery::<CookingRecord>::new()
//!     .filter(&live)
//!     .default_order()
//!     .fetch_all(&pool)
//!     .await?;
//! ```

mod builder;
mod predicate;
mod traits;

pub use builder::*;
pub use predicate::*;
pub use traits::*;
