use crate::direction::Direction;
use crate::Floor;

/// Read-only copy of the car state, handed to views between ticks.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorSnapshot {
    pub id: String,
    pub floor: Floor,
    pub direction: Direction,
    pub requests: Vec<Floor>,
    pub passenger_count: usize,
    pub capacity: usize,
    pub min_floor: Floor,
    pub max_floor: Floor,
}

impl ElevatorSnapshot {
    pub fn is_full(&self) -> bool {
        self.passenger_count >= self.capacity
    }

    pub fn has_request_at(&self, floor: Floor) -> bool {
        self.requests.contains(&floor)
    }
}
