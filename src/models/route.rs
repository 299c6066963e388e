use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    #[default]
    Draft,
    Confirmed,
    InTransit,
    Delivered,
    Cancelled,
}

impl RouteState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RouteState::Delivered | RouteState::Cancelled)
    }

    /// Legal transitions: draft -> confirmed -> in_transit -> delivered,
    /// and any non-terminal state -> cancelled.
    pub fn can_transition_to(&self, next: RouteState) -> bool {
        use RouteState::*;
        match (self, next) {
            (Draft, Confirmed) => true,
            (Confirmed, InTransit) => true,
            (InTransit, Delivered) => true,
            (Draft | Confirmed | InTransit, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteState::Draft => write!(f, "draft"),
            RouteState::Confirmed => write!(f, "confirmed"),
            RouteState::InTransit => write!(f, "in_transit"),
            RouteState::Delivered => write!(f, "delivered"),
            RouteState::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for RouteState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(RouteState::Draft),
            "confirmed" => Ok(RouteState::Confirmed),
            "in_transit" => Ok(RouteState::InTransit),
            "delivered" => Ok(RouteState::Delivered),
            "cancelled" => Ok(RouteState::Cancelled),
            _ => Err(format!("Invalid route state: '{}'", s)),
        }
    }
}

/// Aggregate root for a planned delivery tour. Stops are owned exclusively:
/// they reference the route through `Stop::route_id` and live in the fleet
/// arena, never inline here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    /// The picking batch this route was built from. Sub-routes created by
    /// splitting share the parent's batch.
    pub batch_id: Uuid,
    /// Primary coverage area. `None` when the route spans multiple areas
    /// after combination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    pub state: RouteState,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Route {
    pub fn new(batch_id: Uuid) -> Self {
        Route {
            id: Uuid::new_v4(),
            batch_id,
            area_id: None,
            vehicle_id: None,
            state: RouteState::Draft,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_area(mut self, area_id: Option<Uuid>) -> Self {
        self.area_id = area_id;
        self
    }

    pub fn with_vehicle(mut self, vehicle_id: Option<Uuid>) -> Self {
        self.vehicle_id = vehicle_id;
        self
    }

    /// Apply a state transition, rejecting moves the state machine forbids.
    pub fn transition_to(&mut self, next: RouteState) -> Result<(), String> {
        if !self.state.can_transition_to(next) {
            return Err(format!(
                "Illegal route state transition: {} -> {}",
                self.state, next
            ));
        }
        self.state = next;
        Ok(())
    }

    /// Whether the route is still being planned or executed.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }
}
