/// ----- ELEVATOR MODEL -----
/// The car itself: position, direction, pending floor requests and the
/// passengers on board. Owns the SCAN choice of the next floor to visit.
/// Every mutator is total and reports rejection through its return value.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use shared_resources::direction::Direction;
use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::passenger::Passenger;
use shared_resources::Floor;

pub const DEFAULT_ID: &str = "ELV-DEFAULT";

#[derive(Debug, Clone)]
pub struct Elevator {
    id: String,
    min_floor: Floor,
    max_floor: Floor,
    capacity: usize,
    current_floor: Floor,
    direction: Direction,
    requests: BTreeSet<Floor>,
    passengers: VecDeque<Passenger>,
}

impl Elevator {
    pub fn new(min_floor: Floor, max_floor: Floor, capacity: usize) -> Self {
        Self::with_id(DEFAULT_ID, min_floor, max_floor, capacity)
    }

    /// Bounds given in the wrong order are swapped. The car starts at the lowest floor.
    pub fn with_id(id: &str, min_floor: Floor, max_floor: Floor, capacity: usize) -> Self {
        let (min_floor, max_floor) = (min_floor.min(max_floor), min_floor.max(max_floor));
        Elevator {
            id: id.to_string(),
            min_floor,
            max_floor,
            capacity,
            current_floor: min_floor,
            direction: Direction::Idle,
            requests: BTreeSet::new(),
            passengers: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn min_floor(&self) -> Floor {
        self.min_floor
    }

    pub fn max_floor(&self) -> Floor {
        self.max_floor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.passengers.len())
    }

    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn is_valid_floor(&self, floor: Floor) -> bool {
        floor >= self.min_floor && floor <= self.max_floor
    }

    pub fn is_at_boundary(&self) -> bool {
        self.current_floor == self.min_floor || self.current_floor == self.max_floor
    }

    pub fn set_current_floor(&mut self, floor: Floor) -> bool {
        if !self.is_valid_floor(floor) {
            return false;
        }
        self.current_floor = floor;
        true
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    // REQUESTS

    /// Ignored when out of range or equal to the current floor. Duplicates are no-ops.
    pub fn add_request(&mut self, floor: Floor) -> bool {
        if !self.is_valid_floor(floor) || floor == self.current_floor {
            return false;
        }
        self.requests.insert(floor)
    }

    pub fn remove_request(&mut self, floor: Floor) -> bool {
        self.requests.remove(&floor)
    }

    pub fn has_request_at(&self, floor: Floor) -> bool {
        self.requests.contains(&floor)
    }

    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    pub fn has_requests_above(&self) -> bool {
        self.next_above().is_some()
    }

    pub fn has_requests_below(&self) -> bool {
        self.next_below().is_some()
    }

    /// Requested floors in ascending order.
    pub fn requests(&self) -> impl Iterator<Item = Floor> + '_ {
        self.requests.iter().copied()
    }

    // SCAN

    /// Next floor to head for. Keeps sweeping in the current direction while
    /// requests remain ahead, turns around once when they are all behind, and
    /// from IDLE picks the closest request (lower floor on a tie).
    pub fn next_destination(&mut self) -> Option<Floor> {
        match self.direction {
            Direction::Up => self.next_above().or_else(|| self.reverse_toward(Direction::Down)),
            Direction::Down => self.next_below().or_else(|| self.reverse_toward(Direction::Up)),
            Direction::Idle => self.closest_request(),
        }
    }

    fn next_above(&self) -> Option<Floor> {
        self.requests.range(self.current_floor.saturating_add(1)..).next().copied()
    }

    fn next_below(&self) -> Option<Floor> {
        self.requests.range(..self.current_floor).next_back().copied()
    }

    fn reverse_toward(&mut self, direction: Direction) -> Option<Floor> {
        let floor = match direction {
            Direction::Up => self.next_above(),
            Direction::Down => self.next_below(),
            Direction::Idle => None,
        }?;
        self.direction = direction;
        Some(floor)
    }

    fn closest_request(&mut self) -> Option<Floor> {
        // min_by_key keeps the first minimum, so ascending iteration breaks ties downward
        let closest = self
            .requests
            .iter()
            .copied()
            .min_by_key(|floor| (floor - self.current_floor).unsigned_abs())?;
        let direction = Direction::between(self.current_floor, closest);
        if direction != Direction::Idle {
            self.direction = direction;
        }
        Some(closest)
    }

    /// Moves exactly one floor toward `target` and points the car that way.
    /// Returns the new floor, or `None` if already there.
    pub fn advance_toward(&mut self, target: Floor) -> Option<Floor> {
        let direction = Direction::between(self.current_floor, target);
        let next_floor = match direction {
            Direction::Up => self.current_floor + 1,
            Direction::Down => self.current_floor - 1,
            Direction::Idle => return None,
        };
        if !self.set_current_floor(next_floor) {
            return None;
        }
        self.direction = direction;
        Some(next_floor)
    }

    // PASSENGERS

    pub fn can_board(&self, passenger: &Passenger) -> bool {
        !self.is_full() && passenger.start_floor() == self.current_floor
    }

    /// Takes the passenger on board and requests their destination.
    /// A full car or a passenger waiting elsewhere is handed back untouched.
    pub fn add_passenger(&mut self, passenger: Passenger) -> Result<(), Passenger> {
        if !self.can_board(&passenger) {
            return Err(passenger);
        }
        self.add_request(passenger.destination_floor());
        self.passengers.push_back(passenger);
        Ok(())
    }

    /// Removes everyone travelling to `floor`, keeping the others in boarding order.
    pub fn remove_passengers_at(&mut self, floor: Floor) -> Vec<Passenger> {
        let (leaving, staying): (VecDeque<Passenger>, VecDeque<Passenger>) = self
            .passengers
            .drain(..)
            .partition(|passenger| passenger.destination_floor() == floor);
        self.passengers = staying;
        leaving.into()
    }

    pub fn passengers(&self) -> impl Iterator<Item = &Passenger> {
        self.passengers.iter()
    }

    // LIFECYCLE

    pub fn reset(&mut self) {
        self.current_floor = self.min_floor;
        self.direction = Direction::Idle;
        self.requests.clear();
        self.passengers.clear();
    }

    pub fn stop(&mut self) {
        self.direction = Direction::Idle;
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id: self.id.clone(),
            floor: self.current_floor,
            direction: self.direction,
            requests: self.requests().collect(),
            passenger_count: self.passengers.len(),
            capacity: self.capacity,
            min_floor: self.min_floor,
            max_floor: self.max_floor,
        }
    }
}

impl fmt::Display for Elevator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[floor: {}, direction: {}, requests: {:?}, passengers: {}/{}]",
            self.id,
            self.current_floor,
            self.direction,
            self.requests,
            self.passengers.len(),
            self.capacity,
        )
    }
}
