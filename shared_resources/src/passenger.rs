use std::fmt;
use std::time::{Duration, Instant};

use crate::direction::Direction;
use crate::Floor;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassengerId(pub u64);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// One transport request, followed from the hall call to the arrival.
///
/// The lifecycle only moves forward: requested, boarded, arrived.
#[derive(Debug, Clone)]
pub struct Passenger {
    id: PassengerId,
    start_floor: Floor,
    destination_floor: Floor,
    request_time: Instant,
    boarding_time: Option<Instant>,
    arrival_time: Option<Instant>,
}

impl Passenger {
    pub fn new(id: PassengerId, start_floor: Floor, destination_floor: Floor) -> Self {
        Passenger {
            id,
            start_floor,
            destination_floor,
            request_time: Instant::now(),
            boarding_time: None,
            arrival_time: None,
        }
    }

    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn start_floor(&self) -> Floor {
        self.start_floor
    }

    pub fn destination_floor(&self) -> Floor {
        self.destination_floor
    }

    pub fn request_time(&self) -> Instant {
        self.request_time
    }

    pub fn boarding_time(&self) -> Option<Instant> {
        self.boarding_time
    }

    pub fn arrival_time(&self) -> Option<Instant> {
        self.arrival_time
    }

    pub fn direction(&self) -> Direction {
        Direction::between(self.start_floor, self.destination_floor)
    }

    pub fn is_boarded(&self) -> bool {
        self.boarding_time.is_some()
    }

    pub fn has_arrived(&self) -> bool {
        self.arrival_time.is_some()
    }

    /// Stamps the boarding time. Returns `false` if the passenger already boarded.
    pub fn board(&mut self) -> bool {
        if self.boarding_time.is_some() {
            return false;
        }
        self.boarding_time = Some(Instant::now());
        true
    }

    /// Stamps the arrival time. Returns `false` unless the passenger is on board.
    pub fn arrive(&mut self) -> bool {
        if self.boarding_time.is_none() || self.arrival_time.is_some() {
            return false;
        }
        self.arrival_time = Some(Instant::now());
        true
    }

    /// Time spent waiting for the car, still counting if not yet boarded.
    pub fn waiting_time(&self) -> Duration {
        match self.boarding_time {
            Some(boarded) => boarded.duration_since(self.request_time),
            None => self.request_time.elapsed(),
        }
    }

    pub fn riding_time(&self) -> Duration {
        match (self.boarding_time, self.arrival_time) {
            (Some(boarded), Some(arrived)) => arrived.duration_since(boarded),
            _ => Duration::ZERO,
        }
    }

    /// Request to arrival. Falls back to the waiting time while under way.
    pub fn total_time(&self) -> Duration {
        match self.arrival_time {
            Some(arrived) => arrived.duration_since(self.request_time),
            None => self.waiting_time(),
        }
    }
}

impl PartialEq for Passenger {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Passenger {}

impl fmt::Display for Passenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}->{}]", self.id, self.start_floor, self.destination_floor)
    }
}
