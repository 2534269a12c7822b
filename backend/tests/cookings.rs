//! Integration tests for cooking queries against SQLite
//!
//! Every test opens its own in-memory database with the embedded migrations
//! and seeds it through `CookingRepository`.

use assert_matches::assert_matches;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use cooking_service::db::{CookingRecord, CreateCooking, CreateFlight, CreateJump, Database};
use cooking_service::graphql::build_schema;
use cooking_service::orm::Predicate;
use cooking_service::services::cookings::{
    CookingComponent, CookingService, CookingStatus, CookingStore, compose, derive_components,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    day(10)
}

async fn database() -> Database {
    // One connection: every connection to :memory: is a separate database
    let db = Database::connect("sqlite::memory:", 1).await.unwrap();
    db.migrate().await.unwrap();
    db
}

async fn insert(
    db: &Database,
    cooking_id: &str,
    owner: i64,
    secondary: Option<i64>,
    start: u32,
    end: u32,
    cancelled: bool,
) -> CookingRecord {
    db.cookings()
        .create(CreateCooking {
            cooking_id: cooking_id.to_string(),
            owner_user_id: owner,
            secondary_user_id: secondary,
            start_date: day(start),
            end_date: day(end),
            is_cancelled: cancelled,
        })
        .await
        .unwrap()
}

/// User 1 owns an upcoming, a finished and a cancelled trip and shares one in
/// progress; one stale and one invalidated trip are hidden.
async fn seeded() -> Database {
    let db = database().await;
    insert(&db, "upcoming", 1, None, 12, 15, false).await;
    insert(&db, "finished", 1, None, 2, 5, false).await;
    insert(&db, "other-user", 3, None, 12, 15, false).await;
    insert(&db, "shared", 2, Some(1), 9, 11, false).await;
    insert(&db, "cancelled", 1, None, 20, 22, true).await;

    let stale = insert(&db, "stale", 1, None, 13, 14, false).await;
    db.cookings().mark_stale(stale.id, day(5)).await.unwrap();
    let invalid = insert(&db, "invalid", 1, None, 3, 4, false).await;
    db.cookings().invalidate(invalid.id, day(5)).await.unwrap();

    db
}

fn cooking_ids(records: &[CookingRecord]) -> Vec<&str> {
    records.iter().map(|r| r.cooking_id.as_str()).collect()
}

#[tokio::test]
async fn test_create_round_trips_fields() {
    let db = database().await;
    let created = insert(&db, "ck_1", 7, Some(8), 12, 15, true).await;

    assert_eq!(created.cooking_id, "ck_1");
    assert_eq!(created.owner_user_id, 7);
    assert_eq!(created.secondary_user_id, Some(8));
    assert_eq!(created.start_date, day(12));
    assert_eq!(created.end_date, day(15));
    assert!(created.is_cancelled);
    assert!(created.is_live());
}

#[tokio::test]
async fn test_get_by_cooking_id_hides_soft_deleted() {
    let service = CookingService::new(seeded().await.cookings());

    let found = service.get_by_cooking_id("upcoming").await.unwrap();
    assert_matches!(found, Some(record) if record.owner_user_id == 1);

    assert_matches!(service.get_by_cooking_id("stale").await, Ok(None));
    assert_matches!(service.get_by_cooking_id("invalid").await, Ok(None));
    assert_matches!(service.get_by_cooking_id("nope").await, Ok(None));
}

#[tokio::test]
async fn test_get_by_cooking_id_returns_live_version() {
    let db = database().await;
    let old = insert(&db, "ck_1", 1, None, 12, 15, false).await;
    db.cookings().mark_stale(old.id, day(6)).await.unwrap();
    let current = insert(&db, "ck_1", 1, None, 12, 16, false).await;

    let found = CookingService::new(db.cookings())
        .get_by_cooking_id("ck_1")
        .await
        .unwrap();
    assert_eq!(found.map(|r| r.id), Some(current.id));
}

#[tokio::test]
async fn test_get_by_pk_ignores_live_filter() {
    let db = database().await;
    let record = insert(&db, "ck_1", 1, None, 12, 15, false).await;
    assert!(db.cookings().mark_stale(record.id, day(6)).await.unwrap());

    let found = CookingService::new(db.cookings())
        .get_by_pk(record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.stale_at, Some(day(6)));
    assert!(!found.is_live());

    assert!(!db.cookings().mark_stale(9999, day(6)).await.unwrap());
}

#[tokio::test]
async fn test_count_by_user() {
    let service = CookingService::new(seeded().await.cookings());

    assert_eq!(service.count_by_user(1, None, now()).await.unwrap(), 4);
    assert_eq!(service.count_by_user(1, Some(true), now()).await.unwrap(), 2);
    assert_eq!(service.count_by_user(1, Some(false), now()).await.unwrap(), 1);
    assert_eq!(service.count_by_user(2, None, now()).await.unwrap(), 1);
    assert_eq!(service.count_by_user(99, None, now()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_active_count_equals_active_listing() {
    let service = CookingService::new(seeded().await.cookings());

    for user in [1, 2, 3] {
        let listed = service
            .list_by_user(user, &[CookingStatus::Upcoming, CookingStatus::OnTrip], now())
            .await
            .unwrap();
        let counted = service.count_by_user(user, Some(true), now()).await.unwrap();
        assert_eq!(counted, listed.len() as u64, "user {}", user);
    }
}

#[tokio::test]
async fn test_list_by_user_ordering_and_statuses() {
    let service = CookingService::new(seeded().await.cookings());

    let all = service.list_by_user(1, &[], now()).await.unwrap();
    assert_eq!(
        cooking_ids(&all),
        vec!["finished", "shared", "upcoming", "cancelled"]
    );

    let upcoming = service
        .list_by_user(1, &[CookingStatus::Upcoming], now())
        .await
        .unwrap();
    assert_eq!(cooking_ids(&upcoming), vec!["upcoming"]);

    let on_trip = service
        .list_by_user(1, &[CookingStatus::OnTrip], now())
        .await
        .unwrap();
    assert_eq!(cooking_ids(&on_trip), vec!["shared"]);

    let cancelled = service
        .list_by_user(1, &[CookingStatus::Canceled, CookingStatus::PostTrip], now())
        .await
        .unwrap();
    assert_eq!(cooking_ids(&cancelled), vec!["finished", "cancelled"]);
}

#[tokio::test]
async fn test_unmapped_statuses_do_not_filter() {
    let service = CookingService::new(seeded().await.cookings());

    let processing = service
        .list_by_user(1, &[CookingStatus::Processing, CookingStatus::Cancelled], now())
        .await
        .unwrap();
    let unfiltered = service.list_by_user(1, &[], now()).await.unwrap();
    assert_eq!(processing, unfiltered);
}

#[tokio::test]
async fn test_sql_and_memory_evaluation_agree() {
    let db = seeded().await;
    let repo = db.cookings();

    let everything = repo.find_all(&Predicate::And(vec![])).await.unwrap();
    assert_eq!(everything.len(), 7);

    let status_sets: [&[CookingStatus]; 5] = [
        &[],
        &[CookingStatus::Upcoming],
        &[CookingStatus::OnTrip, CookingStatus::PostTrip],
        &[CookingStatus::Canceled],
        &[CookingStatus::Processing],
    ];
    for user in [1, 2, 3] {
        for statuses in status_sets {
            let predicate = compose(statuses, user, user, None, now());
            let from_sql = repo.find_all(&predicate).await.unwrap();
            let in_memory: Vec<_> = everything
                .iter()
                .filter(|r| predicate.matches(*r))
                .cloned()
                .collect();
            assert_eq!(from_sql, in_memory, "user {} statuses {:?}", user, statuses);
        }
    }
}

#[tokio::test]
async fn test_reservations_and_components() {
    let db = database().await;
    let repo = db.cookings();
    let none = insert(&db, "none", 1, None, 12, 15, false).await;
    let flight_only = insert(&db, "flight", 1, None, 13, 15, false).await;
    let both = insert(&db, "both", 1, None, 14, 15, false).await;

    repo.add_flight(
        flight_only.id,
        CreateFlight {
            flight_number: "LX 318".to_string(),
            departs_at: day(13),
        },
    )
    .await
    .unwrap();
    repo.add_jump(
        both.id,
        CreateJump {
            location: "Interlaken".to_string(),
            jump_at: day(14),
        },
    )
    .await
    .unwrap();
    repo.add_flight(
        both.id,
        CreateFlight {
            flight_number: "LX 319".to_string(),
            departs_at: day(14),
        },
    )
    .await
    .unwrap();

    let listed = CookingService::new(repo)
        .list_by_user(1, &[], now())
        .await
        .unwrap();
    let components: Vec<_> = listed.iter().map(derive_components).collect();
    assert_eq!(
        components,
        vec![
            vec![],
            vec![CookingComponent::Flight],
            vec![CookingComponent::Flight, CookingComponent::Jump],
        ]
    );
    assert_eq!(listed[0].id, none.id);
    assert_eq!(listed[2].reservations.flights[0].flight_number, "LX 319");
    assert_eq!(listed[2].reservations.jumps[0].location, "Interlaken");
}

#[tokio::test]
async fn test_listing_more_cookings_than_bind_variables() {
    const BULK: i64 = 33_000;

    let db = database().await;
    sqlx::query(
        r#"
        WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < ?)
        INSERT INTO cookings (
            cooking_id, owner_user_id, start_date, end_date, is_cancelled, created_at, updated_at
        )
        SELECT 'bulk-' || i, 1, ?, ?, 0, ?, ? FROM n
        "#,
    )
    .bind(BULK)
    .bind("2024-01-12T00:00:00.000000Z")
    .bind("2024-01-15T00:00:00.000000Z")
    .bind("2024-01-01T00:00:00.000000Z")
    .bind("2024-01-01T00:00:00.000000Z")
    .execute(db.pool())
    .await
    .unwrap();

    // Reservation on the last row, far past the first batch of ids
    db.cookings()
        .add_flight(
            BULK,
            CreateFlight {
                flight_number: "LX 318".to_string(),
                departs_at: day(12),
            },
        )
        .await
        .unwrap();

    let service = CookingService::new(db.cookings());
    let counted = service.count_by_user(1, None, now()).await.unwrap();
    let listed = service.list_by_user(1, &[], now()).await.unwrap();

    assert_eq!(counted, BULK as u64);
    assert_eq!(listed.len() as u64, counted);
    let with_flights: Vec<i64> = listed
        .iter()
        .filter(|r| !r.reservations.flights.is_empty())
        .map(|r| r.id)
        .collect();
    assert_eq!(with_flights, vec![BULK]);
}

#[tokio::test]
async fn test_sub_microsecond_now_classifies_like_sql() {
    let db = database().await;
    let record = insert(&db, "ending", 1, None, 8, 10, false).await;
    let repo = db.cookings();

    // Same stored microsecond as end_date, a few nanoseconds later
    let now = day(10) + chrono::Duration::nanoseconds(400);
    for status in [CookingStatus::OnTrip, CookingStatus::PostTrip] {
        let predicate = compose(&[status], 1, 1, None, now);
        let from_sql = repo.count(&predicate).await.unwrap();
        let in_memory = u64::from(predicate.matches(&record));
        assert_eq!(from_sql, in_memory, "{:?}", status);
    }
    assert_eq!(
        repo.count(&compose(&[CookingStatus::OnTrip], 1, 1, None, now))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_file_database_persists_between_pools() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookings.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::connect(path, 2).await.unwrap();
        db.migrate().await.unwrap();
        insert(&db, "ck_1", 1, None, 12, 15, false).await;
        db.pool().close().await;
    }

    let db = Database::connect(path, 2).await.unwrap();
    let count = CookingService::new(db.cookings())
        .count_by_user(1, None, now())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_graphql_queries() {
    let db = seeded().await;
    let upcoming_pk = db
        .cookings()
        .find_one(&Predicate::eq("cooking_id", "upcoming"))
        .await
        .unwrap()
        .unwrap()
        .id;
    db.cookings()
        .add_flight(
            upcoming_pk,
            CreateFlight {
                flight_number: "LX 318".to_string(),
                departs_at: day(12),
            },
        )
        .await
        .unwrap();
    let schema = build_schema(db);

    let response = schema
        .execute(
            r#"{
                cooking(cookingId: "upcoming") { cookingId ownerUserId isCancelled components }
                stale: cooking(cookingId: "stale") { cookingId }
                all: cookingCountByUser(userId: 1)
                cookingsByUser(userId: 1, statuses: [CANCELED]) { cookingId }
            }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(
        data,
        serde_json::json!({
            "cooking": {
                "cookingId": "upcoming",
                "ownerUserId": 1,
                "isCancelled": false,
                "components": ["FLIGHT"],
            },
            "stale": null,
            "all": 4,
            "cookingsByUser": [{ "cookingId": "cancelled" }],
        })
    );
}

#[tokio::test]
async fn test_graphql_cooking_by_pk_returns_stale() {
    let db = database().await;
    let record = insert(&db, "ck_1", 1, None, 12, 15, false).await;
    db.cookings().mark_stale(record.id, day(6)).await.unwrap();
    let schema = build_schema(db);

    let query = format!(
        "{{ cookingByPk(cookingId: {}) {{ cookingId staleAt }} }}",
        record.id
    );
    let data = schema.execute(query).await.data.into_json().unwrap();
    assert_eq!(data["cookingByPk"]["cookingId"], "ck_1");
    assert!(data["cookingByPk"]["staleAt"].is_string());
}
