use serde::{Deserialize, Serialize};

use crate::db::CookingRecord;

/// Kind of reservation a cooking contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CookingComponent {
    Flight,
    Jump,
}

/// Components present on a cooking, flights first.
pub fn derive_components(cooking: &CookingRecord) -> Vec<CookingComponent> {
    let reservations = &cooking.reservations;
    let mut components = Vec::with_capacity(2);
    if !reservations.flights.is_empty() {
        components.push(CookingComponent::Flight);
    }
    if !reservations.jumps.is_empty() {
        components.push(CookingComponent::Jump);
    }
    components
}
