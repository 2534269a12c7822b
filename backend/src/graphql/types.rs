//! GraphQL type definitions

use async_graphql::{Enum, Object, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::db::{CookingRecord, FlightRecord, JumpRecord};
use crate::services::cookings::{
    CookingComponent as ServiceCookingComponent, CookingStatus as ServiceCookingStatus,
    derive_components,
};

/// Status category to filter cookings by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CookingStatus {
    Upcoming,
    OnTrip,
    PostTrip,
    Canceled,
    /// Currently matches every cooking
    Processing,
    /// Currently matches every cooking; use CANCELED for cancelled trips
    Cancelled,
}

impl From<CookingStatus> for ServiceCookingStatus {
    fn from(status: CookingStatus) -> Self {
        match status {
            CookingStatus::Upcoming => ServiceCookingStatus::Upcoming,
            CookingStatus::OnTrip => ServiceCookingStatus::OnTrip,
            CookingStatus::PostTrip => ServiceCookingStatus::PostTrip,
            CookingStatus::Canceled => ServiceCookingStatus::Canceled,
            CookingStatus::Processing => ServiceCookingStatus::Processing,
            CookingStatus::Cancelled => ServiceCookingStatus::Cancelled,
        }
    }
}

/// Kind of reservation contained in a cooking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CookingComponent {
    Flight,
    Jump,
}

impl From<ServiceCookingComponent> for CookingComponent {
    fn from(component: ServiceCookingComponent) -> Self {
        match component {
            ServiceCookingComponent::Flight => CookingComponent::Flight,
            ServiceCookingComponent::Jump => CookingComponent::Jump,
        }
    }
}

/// A flight reservation
#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub flight_number: String,
    /// Departure time (ISO 8601 timestamp)
    pub departs_at: String,
}

impl From<&FlightRecord> for Flight {
    fn from(r: &FlightRecord) -> Self {
        Self {
            id: r.id,
            flight_number: r.flight_number.clone(),
            departs_at: r.departs_at.to_rfc3339(),
        }
    }
}

/// A jump reservation
#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct Jump {
    pub id: i64,
    pub location: String,
    /// Jump time (ISO 8601 timestamp)
    pub jump_at: String,
}

impl From<&JumpRecord> for Jump {
    fn from(r: &JumpRecord) -> Self {
        Self {
            id: r.id,
            location: r.location.clone(),
            jump_at: r.jump_at.to_rfc3339(),
        }
    }
}

/// A trip booked by one user and optionally shared with another
pub struct Cooking(pub CookingRecord);

impl From<CookingRecord> for Cooking {
    fn from(record: CookingRecord) -> Self {
        Self(record)
    }
}

#[Object]
impl Cooking {
    /// Internal identifier
    async fn id(&self) -> i64 {
        self.0.id
    }

    /// External identifier
    async fn cooking_id(&self) -> &str {
        &self.0.cooking_id
    }

    async fn owner_user_id(&self) -> i64 {
        self.0.owner_user_id
    }

    async fn secondary_user_id(&self) -> Option<i64> {
        self.0.secondary_user_id
    }

    async fn start_date(&self) -> String {
        self.0.start_date.to_rfc3339()
    }

    async fn end_date(&self) -> String {
        self.0.end_date.to_rfc3339()
    }

    async fn is_cancelled(&self) -> bool {
        self.0.is_cancelled
    }

    async fn stale_at(&self) -> Option<String> {
        self.0.stale_at.map(|t| t.to_rfc3339())
    }

    async fn invalidated_at(&self) -> Option<String> {
        self.0.invalidated_at.map(|t| t.to_rfc3339())
    }

    async fn flights(&self) -> Vec<Flight> {
        self.0.reservations.flights.iter().map(Flight::from).collect()
    }

    async fn jumps(&self) -> Vec<Jump> {
        self.0.reservations.jumps.iter().map(Jump::from).collect()
    }

    /// Reservation kinds present, FLIGHT before JUMP
    async fn components(&self) -> Vec<CookingComponent> {
        derive_components(&self.0)
            .into_iter()
            .map(CookingComponent::from)
            .collect()
    }
}
