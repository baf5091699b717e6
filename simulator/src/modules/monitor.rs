/// ----- MONITOR MODULE -----
/// Counts ticks, lets passengers off and on at the current floor, and ends
/// the run once there is nothing left to do.

use std::sync::Arc;

use crossbeam_channel::{select, tick, Receiver};

use shared_resources::passenger::{Passenger, PassengerId};
use shared_resources::Floor;

use crate::modules::shared::{Shared, SimulationState, WorkerGuard, WorkerStatus};
use crate::utilities::log_sink::{LogLevel, LogSink};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct TickReport {
    pub(crate) tick: u64,
    pub(crate) exited: Vec<PassengerId>,
    pub(crate) boarded: Vec<PassengerId>,
    pub(crate) finished: bool,
}

impl TickReport {
    fn is_quiet(&self) -> bool {
        self.exited.is_empty() && self.boarded.is_empty()
    }
}

pub(crate) fn main(shared: Arc<Shared>, shutdown_rx: Receiver<()>, mut worker: WorkerGuard) {
    let ticker = tick(shared.timing.tick());
    shared.log(LogLevel::Info, "status monitor started");
    worker.set_status(WorkerStatus::Running);

    while shared.is_running() {
        select! {
            recv(ticker) -> _ => {
                let report = {
                    let mut state = shared.state.lock();
                    let report = step(&mut state, shared.sink(), &shared.request_rx);
                    if report.finished {
                        // cleared under the lock so no request can slip in after the check
                        shared.set_running(false);
                    }
                    report
                };
                if report.finished {
                    shared.log(LogLevel::Info, &format!("simulation complete after {} ticks", report.tick));
                }
                worker.set_status(if report.is_quiet() { WorkerStatus::Waiting } else { WorkerStatus::Running });
                shared.notify_state_changed();
            },
            recv(shutdown_rx) -> _ => break,
        }
    }
}

/// One monitor tick. The caller holds the state lock.
pub(crate) fn step(state: &mut SimulationState, log: &dyn LogSink, request_rx: &Receiver<Floor>) -> TickReport {
    state.ticks += 1;
    let mut report = TickReport {
        tick: state.ticks,
        ..TickReport::default()
    };
    log.log(LogLevel::Debug, &format!("--- tick {} ---", state.ticks));

    let SimulationState { elevator, passengers, .. } = state;
    let floor = elevator.current_floor();

    report.exited = passengers
        .get_exiting_passengers(elevator.passengers(), floor)
        .into_iter()
        .map(Passenger::id)
        .collect();
    if !report.exited.is_empty() {
        for passenger in elevator.remove_passengers_at(floor) {
            passengers.process_passenger_exit(passenger);
        }
    }

    let boarding = passengers.get_boarding_passengers(floor, elevator.direction(), elevator.available_capacity());
    let mut refused = Vec::new();
    for mut passenger in boarding {
        if !elevator.can_board(&passenger) {
            refused.push(passenger);
            continue;
        }
        passengers.process_passenger_boarding(&mut passenger);
        let id = passenger.id();
        match elevator.add_passenger(passenger) {
            Ok(()) => report.boarded.push(id),
            Err(passenger) => refused.push(passenger),
        }
    }
    // back to the head of the queue in their original order
    for passenger in refused.into_iter().rev() {
        passengers.return_to_queue(passenger);
    }

    if elevator.remove_request(floor) {
        log.log(LogLevel::Debug, &format!("floor {floor} served"));
    }

    report.finished = !elevator.has_requests()
        && !passengers.has_waiting_passengers()
        && elevator.is_empty()
        && request_rx.is_empty();
    if report.finished {
        elevator.stop();
    }
    report
}
