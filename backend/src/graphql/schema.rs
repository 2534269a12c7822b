//! Schema assembly

use async_graphql::extensions::Tracing;
use async_graphql::{EmptyMutation, EmptySubscription, MergedObject, Schema};

use super::queries::CookingQueries;
use crate::db::Database;
use crate::services::cookings::CookingService;

pub type CookingSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(CookingQueries);

/// Build the GraphQL schema with the cooking service in its context
pub fn build_schema(db: Database) -> CookingSchema {
    Schema::build(QueryRoot::default(), EmptyMutation, EmptySubscription)
        .data(CookingService::new(db.cookings()))
        .extension(Tracing)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sdl_exposes_cooking_fields() {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        let sdl = build_schema(db).sdl();

        for field in [
            "cooking(cookingId: String!): Cooking",
            "cookingByPk(cookingId: Int!): Cooking",
            "cookingCountByUser(userId: Int!, active: Boolean)",
            "cookingsByUser(userId: Int!, statuses: [CookingStatus!]): [Cooking!]!",
            "components: [CookingComponent!]!",
        ] {
            assert!(sdl.contains(field), "missing `{}` in SDL:\n{}", field, sdl);
        }
        assert!(sdl.contains("ON_TRIP"));
    }
}
