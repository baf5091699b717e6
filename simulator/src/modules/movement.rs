/// ----- MOVEMENT MODULE -----
/// Drives the car one floor per tick toward the SCAN destination, and
/// decides on reversal or rest when nothing lies ahead.

use std::sync::Arc;

use crossbeam_channel::{select, tick, Receiver};

use shared_resources::direction::Direction;
use shared_resources::Floor;

use crate::modules::shared::{Shared, SimulationState, WorkerGuard, WorkerStatus};
use crate::utilities::elevator::Elevator;
use crate::utilities::log_sink::LogLevel;
use crate::utilities::passenger_service::PassengerService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Movement {
    Moved { from: Floor, to: Floor, direction: Direction },
    /// The current floor is still requested; wait for the monitor to serve it.
    Serving(Floor),
    Reversed { from: Direction, to: Direction },
    /// Came to rest: nothing requested and nobody waiting.
    Stopped,
    Resting,
    /// Only passengers the car cannot take yet are waiting here.
    Holding,
}

pub(crate) fn main(shared: Arc<Shared>, shutdown_rx: Receiver<()>, mut worker: WorkerGuard) {
    let ticker = tick(shared.timing.tick());
    shared.log(LogLevel::Info, "movement control started");
    worker.set_status(WorkerStatus::Running);

    while shared.is_running() {
        select! {
            recv(ticker) -> _ => {
                let movement = step(&mut shared.state.lock());
                match movement {
                    Movement::Moved { from, to, direction } => {
                        shared.log(LogLevel::Info, &format!("moved {from} -> {to} ({direction})"));
                    },
                    Movement::Reversed { from, to } => {
                        shared.log(LogLevel::Info, &format!("direction change: {from} -> {to}"));
                    },
                    Movement::Stopped => {
                        shared.log(LogLevel::Info, "all requests served, car at rest");
                    },
                    Movement::Serving(_) | Movement::Resting | Movement::Holding => (),
                }
                worker.set_status(match movement {
                    Movement::Moved { .. } | Movement::Serving(_) | Movement::Reversed { .. } => WorkerStatus::Running,
                    Movement::Stopped | Movement::Resting | Movement::Holding => WorkerStatus::Waiting,
                });
                shared.notify_state_changed();
            },
            recv(shutdown_rx) -> _ => break,
        }
    }
}

/// One movement tick. The caller holds the state lock.
pub(crate) fn step(state: &mut SimulationState) -> Movement {
    let SimulationState { elevator, passengers, .. } = state;

    // hall calls that have not come through the channel yet
    for floor in passengers.waiting_passenger_floors() {
        elevator.add_request(floor);
    }

    let floor = elevator.current_floor();
    if elevator.has_request_at(floor) {
        return Movement::Serving(floor);
    }

    match elevator.next_destination() {
        Some(target) => match elevator.advance_toward(target) {
            Some(to) => Movement::Moved {
                from: floor,
                to,
                direction: elevator.direction(),
            },
            None => Movement::Serving(floor),
        },
        None => change_direction(elevator, passengers),
    }
}

/// Called once `next_destination` found nothing, so the request set is empty;
/// requests behind the car were already taken by the sweep reversing itself.
fn change_direction(elevator: &mut Elevator, passengers: &PassengerService) -> Movement {
    let current = elevator.direction();
    if !passengers.has_waiting_passengers() {
        if current == Direction::Idle {
            return Movement::Resting;
        }
        elevator.stop();
        return Movement::Stopped;
    }

    // Everyone left is waiting on this floor. An idle car takes them all;
    // a moving one turns to face them.
    if current != Direction::Idle {
        if let Some(wanted) = passengers.waiting_direction_at(elevator.current_floor()) {
            if wanted != current && wanted != Direction::Idle {
                elevator.set_direction(wanted);
                return Movement::Reversed { from: current, to: wanted };
            }
        }
    }
    Movement::Holding
}
