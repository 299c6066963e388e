use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::ops::Add;
use time::OffsetDateTime;
use uuid::Uuid;

/// Cargo demand aggregated over a stop's orders. Additive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Demand {
    pub weight_kg: f64,
    pub volume_m3: f64,
}

impl Demand {
    pub const ZERO: Demand = Demand {
        weight_kg: 0.0,
        volume_m3: 0.0,
    };

    pub fn new(weight_kg: f64, volume_m3: f64) -> Self {
        Demand {
            weight_kg,
            volume_m3,
        }
    }
}

impl Add for Demand {
    type Output = Demand;

    fn add(self, other: Demand) -> Demand {
        Demand {
            weight_kg: self.weight_kg + other.weight_kg,
            volume_m3: self.volume_m3 + other.volume_m3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopState {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Adjusted,
}

/// One delivery location within a route. Belongs to exactly one route at a
/// time; `route_id` is the single ownership pointer and moving a stop between
/// routes is one atomic reassignment of that field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub id: Uuid,
    pub route_id: Uuid,
    pub customer_name: String,
    pub location: Coordinates,
    /// Visiting position, 1-based. Sequence values within a route are always
    /// a contiguous permutation of `1..=N`.
    pub sequence: u32,
    pub demand: Demand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<Uuid>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_window_start: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_window_end: Option<OffsetDateTime>,
    /// Sale-order priority tier 0-4; 3 and 4 are SLA-critical and are kept
    /// first when an oversized area is partitioned.
    pub priority: u8,
    pub state: StopState,
}

impl Stop {
    pub fn new(
        route_id: Uuid,
        customer_name: impl Into<String>,
        location: Coordinates,
        demand: Demand,
    ) -> Self {
        Stop {
            id: Uuid::new_v4(),
            route_id,
            customer_name: customer_name.into(),
            location,
            sequence: 0,
            demand,
            area_id: None,
            time_window_start: None,
            time_window_end: None,
            priority: 0,
            state: StopState::Pending,
        }
    }

    pub fn with_area(mut self, area_id: Uuid) -> Self {
        self.area_id = Some(area_id);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_time_window(
        mut self,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
    ) -> Self {
        self.time_window_start = start;
        self.time_window_end = end;
        self
    }
}
