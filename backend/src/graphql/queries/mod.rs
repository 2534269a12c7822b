pub mod cookings;

pub use cookings::CookingQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::db::CookingRepository;
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::cookings::CookingService;
}
