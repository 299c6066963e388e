use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named coverage region of customers, used to group, split and combine
/// routes. Referenced (never owned) by stops and routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    /// Short unique code, e.g. `NORTH`. Derived from the name when absent.
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    /// Cached centroid of member customer locations. Recomputed whenever
    /// membership changes so adjacency checks stay pure and fast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<Coordinates>,
}

impl Area {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Area {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            description: None,
            active: true,
            representative: None,
        }
    }

    /// Generate an area code from its name: uppercase, separators collapsed
    /// to underscores.
    pub fn code_from_name(name: &str) -> String {
        if name.is_empty() {
            return "UNNAMED_AREA".to_string();
        }
        name.to_uppercase().replace([' ', '-'], "_")
    }

    /// Recompute the cached representative coordinate from the current
    /// member customer locations. Clears it when there are no members.
    pub fn recompute_representative(&mut self, member_locations: &[Coordinates]) {
        self.representative = Coordinates::centroid(member_locations);
    }
}
