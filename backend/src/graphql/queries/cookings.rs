use chrono::Utc;

use super::prelude::*;
use crate::services::cookings::CookingStatus as ServiceCookingStatus;

#[derive(Default)]
pub struct CookingQueries;

fn service<'a>(ctx: &Context<'a>) -> &'a CookingService<CookingRepository> {
    ctx.data_unchecked::<CookingService<CookingRepository>>()
}

#[Object]
impl CookingQueries {
    /// Get a live cooking by its external identifier
    async fn cooking(&self, ctx: &Context<'_>, cooking_id: String) -> Result<Option<Cooking>> {
        let record = service(ctx)
            .get_by_cooking_id(&cooking_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(record.map(Cooking::from))
    }

    /// Get a cooking by its internal identifier, including stale ones
    async fn cooking_by_pk(&self, ctx: &Context<'_>, cooking_id: i64) -> Result<Option<Cooking>> {
        let record = service(ctx)
            .get_by_pk(cooking_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(record.map(Cooking::from))
    }

    /// Count a user's live cookings, optionally only active (true) or finished (false) ones
    async fn cooking_count_by_user(
        &self,
        ctx: &Context<'_>,
        user_id: i64,
        active: Option<bool>,
    ) -> Result<u64> {
        service(ctx)
            .count_by_user(user_id, active, Utc::now())
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    /// List a user's live cookings ordered by start date
    async fn cookings_by_user(
        &self,
        ctx: &Context<'_>,
        user_id: i64,
        statuses: Option<Vec<CookingStatus>>,
    ) -> Result<Vec<Cooking>> {
        let statuses: Vec<ServiceCookingStatus> = statuses
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();

        let records = service(ctx)
            .list_by_user(user_id, &statuses, Utc::now())
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(Cooking::from).collect())
    }
}
