use crate::models::Demand;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Weight/volume bounds a route's cargo must respect once confirmed.
/// A component of `0` means that dimension is unconstrained, matching
/// fleet records where only one of the two limits is maintained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VehicleCapacity {
    pub max_weight_kg: f64,
    pub max_volume_m3: f64,
}

impl VehicleCapacity {
    pub fn new(max_weight_kg: f64, max_volume_m3: f64) -> Result<Self, String> {
        if max_weight_kg < 0.0 || max_volume_m3 < 0.0 {
            return Err(format!(
                "Capacity components must be >= 0, got ({}, {})",
                max_weight_kg, max_volume_m3
            ));
        }
        Ok(VehicleCapacity {
            max_weight_kg,
            max_volume_m3,
        })
    }

    /// Whether the given cargo fits within this capacity.
    pub fn fits(&self, demand: &Demand) -> bool {
        let weight_ok = self.max_weight_kg <= 0.0 || demand.weight_kg <= self.max_weight_kg;
        let volume_ok = self.max_volume_m3 <= 0.0 || demand.volume_m3 <= self.max_volume_m3;
        weight_ok && volume_ok
    }
}

/// Read-only fleet input; owned by the external fleet registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub capacity: VehicleCapacity,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, capacity: VehicleCapacity) -> Self {
        Vehicle {
            id: Uuid::new_v4(),
            name: name.into(),
            capacity,
        }
    }
}
