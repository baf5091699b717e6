/// ----- PASSENGER SERVICE -----
/// Keeps the hall queue of waiting passengers and the history of completed
/// trips. Decides who may board at a floor; the car itself owns the
/// passengers while they ride.

use std::collections::VecDeque;
use std::sync::Arc;

use shared_resources::direction::Direction;
use shared_resources::passenger::{Passenger, PassengerId};
use shared_resources::Floor;

use crate::utilities::log_sink::{LogLevel, LogSink};

pub struct PassengerService {
    waiting_passengers: VecDeque<Passenger>,
    completed_passengers: Vec<Passenger>,
    next_id: u64,
    log: Arc<dyn LogSink>,
}

impl PassengerService {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        PassengerService {
            waiting_passengers: VecDeque::new(),
            completed_passengers: Vec::new(),
            next_id: 1,
            log,
        }
    }

    /// Creates a passenger with a fresh id and puts them at the back of the queue.
    pub fn add_passenger_request(&mut self, start_floor: Floor, destination_floor: Floor) -> PassengerId {
        let id = PassengerId(self.next_id);
        self.next_id += 1;
        let passenger = Passenger::new(id, start_floor, destination_floor);
        self.log.log(LogLevel::Info, &format!("passenger request added: {passenger}"));
        self.waiting_passengers.push_back(passenger);
        id
    }

    /// Queues a passenger built elsewhere. Later generated ids stay above theirs.
    pub fn enqueue(&mut self, passenger: Passenger) {
        self.next_id = self.next_id.max(passenger.id().0 + 1);
        self.log.log(LogLevel::Info, &format!("passenger queued: {passenger}"));
        self.waiting_passengers.push_back(passenger);
    }

    /// Puts a passenger the car turned away back at the head of the queue.
    pub fn return_to_queue(&mut self, passenger: Passenger) {
        self.waiting_passengers.push_front(passenger);
    }

    pub fn get_exiting_passengers<'a, I>(&self, onboard: I, floor: Floor) -> Vec<&'a Passenger>
    where
        I: IntoIterator<Item = &'a Passenger>,
    {
        onboard
            .into_iter()
            .filter(|passenger| passenger.destination_floor() == floor)
            .collect()
    }

    /// Stamps the arrival and files the trip as completed.
    /// Must be called once per exit; a second call would count the trip twice.
    pub fn process_passenger_exit(&mut self, mut passenger: Passenger) {
        passenger.arrive();
        self.log.log(
            LogLevel::Info,
            &format!(
                "  {passenger} left the car (total {:.1}s)",
                passenger.total_time().as_secs_f64()
            ),
        );
        self.completed_passengers.push(passenger);
    }

    /// Takes from the queue, in arrival order, up to `available_capacity`
    /// passengers waiting at `floor` who travel the car's way. An idle car takes anyone.
    pub fn get_boarding_passengers(
        &mut self,
        floor: Floor,
        elevator_direction: Direction,
        available_capacity: usize,
    ) -> Vec<Passenger> {
        let mut boarding = Vec::new();
        let mut index = 0;
        while index < self.waiting_passengers.len() && boarding.len() < available_capacity {
            let passenger = &self.waiting_passengers[index];
            let eligible = passenger.start_floor() == floor
                && (elevator_direction == Direction::Idle || passenger.direction() == elevator_direction);
            if !eligible {
                index += 1;
                continue;
            }
            if let Some(passenger) = self.waiting_passengers.remove(index) {
                boarding.push(passenger);
            }
        }
        boarding
    }

    /// Stamps the boarding time. The caller moves the passenger into the car.
    pub fn process_passenger_boarding(&self, passenger: &mut Passenger) {
        passenger.board();
        self.log.log(
            LogLevel::Info,
            &format!(
                "  {passenger} boarded (waited {:.1}s)",
                passenger.waiting_time().as_secs_f64()
            ),
        );
    }

    pub fn waiting_passenger_floors(&self) -> Vec<Floor> {
        self.waiting_passengers.iter().map(Passenger::start_floor).collect()
    }

    /// Direction of the first passenger queued at `floor`, if any.
    pub fn waiting_direction_at(&self, floor: Floor) -> Option<Direction> {
        self.waiting_passengers
            .iter()
            .find(|passenger| passenger.start_floor() == floor)
            .map(Passenger::direction)
    }

    pub fn has_waiting_passengers(&self) -> bool {
        !self.waiting_passengers.is_empty()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting_passengers.len()
    }

    pub fn waiting_passengers(&self) -> Vec<Passenger> {
        self.waiting_passengers.iter().cloned().collect()
    }

    pub fn completed_passengers(&self) -> &[Passenger] {
        &self.completed_passengers
    }
}
