/// ----- ELEVATOR SERVICE -----
/// The dispatch engine: one car, one passenger queue and three worker
/// threads (request ingestion, movement control, status monitor) sharing
/// a single lock.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use shared_resources::config::{SimulationConfig, TimingConfig};
use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::passenger::{Passenger, PassengerId};
use shared_resources::request::{PassengerRequest, RequestError};
use shared_resources::Floor;

use crate::utilities::elevator::Elevator;
use crate::utilities::log_sink::{LogLevel, LogSink, TracingSink};
use crate::utilities::passenger_service::PassengerService;
use crate::utilities::statistics::Statistics;

mod monitor;
mod movement;
mod requests;
mod shared;

use shared::{Shared, SimulationState, WorkerGuard};
pub use shared::{StateListener, WorkerStatus, WorkerStatusListener};

pub const REQUEST_WORKER: &str = "request-processor";
pub const MOVEMENT_WORKER: &str = "movement-control";
pub const MONITOR_WORKER: &str = "status-monitor";

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("failed to spawn worker `{name}`: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

struct Workers {
    handles: Vec<(&'static str, JoinHandle<()>)>,
    shutdown_tx: Sender<()>,
    done_rx: Receiver<&'static str>,
}

pub struct ElevatorService {
    shared: Arc<Shared>,
    request_tx: Sender<Floor>,
    phase: Mutex<Phase>,
    workers: Mutex<Option<Workers>>,
}

impl ElevatorService {
    /// Engine with default timing that logs through `tracing`.
    /// Reversed bounds are swapped and a capacity of zero is raised to one.
    pub fn create(min_floor: Floor, max_floor: Floor, capacity: usize) -> Self {
        Self::create_with_log(min_floor, max_floor, capacity, Arc::new(TracingSink))
    }

    pub fn create_with_log(min_floor: Floor, max_floor: Floor, capacity: usize, log: Arc<dyn LogSink>) -> Self {
        if min_floor > max_floor {
            log.log(
                LogLevel::Warn,
                &format!("floor bounds {min_floor}..={max_floor} reversed, using {max_floor}..={min_floor}"),
            );
        }
        if capacity == 0 {
            log.log(LogLevel::Warn, "capacity 0 would never let anyone board, using 1");
        }
        let elevator = Elevator::new(min_floor, max_floor, capacity.max(1));
        Self::with_parts(elevator, TimingConfig::default(), log)
    }

    /// Engine built from a validated configuration. Requests listed in the
    /// configuration are not submitted here.
    pub fn new(config: &SimulationConfig, log: Arc<dyn LogSink>) -> Self {
        let settings = &config.elevator;
        let mut elevator = Elevator::with_id(&settings.id, settings.min_floor, settings.max_floor, settings.capacity);
        elevator.set_current_floor(settings.start_floor());
        Self::with_parts(elevator, config.timing.clone(), log)
    }

    fn with_parts(elevator: Elevator, timing: TimingConfig, log: Arc<dyn LogSink>) -> Self {
        let (request_tx, request_rx) = unbounded();
        let state = SimulationState {
            elevator,
            passengers: PassengerService::new(log.clone()),
            ticks: 0,
        };
        ElevatorService {
            shared: Arc::new(Shared::new(state, request_rx, timing, log)),
            request_tx,
            phase: Mutex::new(Phase::Idle),
            workers: Mutex::new(None),
        }
    }

    pub fn set_worker_status_listener<F>(&self, listener: F)
    where
        F: Fn(&str, WorkerStatus) + Send + Sync + 'static,
    {
        self.shared.set_worker_status_listener(Some(Arc::new(listener)));
    }

    pub fn set_state_listener<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.set_state_listener(Some(Arc::new(listener)));
    }

    pub fn clear_listeners(&self) {
        self.shared.set_worker_status_listener(None);
        self.shared.set_state_listener(None);
    }

    /// Queues a passenger and hands the start floor to the request worker.
    /// Invalid requests are logged and dropped; the error is returned for
    /// callers that care.
    pub fn add_passenger_request(&self, start_floor: Floor, destination_floor: Floor) -> Result<PassengerId, RequestError> {
        let request = PassengerRequest::new(start_floor, destination_floor);
        let id = {
            let mut state = self.shared.state.lock();
            let elevator = &state.elevator;
            if let Err(e) = request.validate(elevator.min_floor(), elevator.max_floor()) {
                drop(state);
                self.shared.log(LogLevel::Warn, &format!("request {request} dropped: {e}"));
                return Err(e);
            }
            state.passengers.add_passenger_request(start_floor, destination_floor)
        };
        // the receiver lives in `shared`, so this cannot fail while we exist
        let _ = self.request_tx.send(start_floor);
        self.shared.notify_state_changed();
        Ok(id)
    }

    pub fn start_simulation(&self) -> Result<(), SimulationError> {
        let mut phase = self.phase.lock();
        if self.shared.is_running() {
            self.shared.log(LogLevel::Debug, "simulation already running");
            return Ok(());
        }
        // a run that finished on its own still has workers to collect
        let finished = self.workers.lock().take();
        if let Some(finished) = finished {
            self.shutdown(finished);
        }
        if *phase != Phase::Idle {
            self.shared.log(LogLevel::Info, "restarting simulation");
        }

        self.shared.set_running(true);
        self.shared.log(LogLevel::Info, "simulation started");

        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        let (done_tx, done_rx) = unbounded();
        let mut workers = Workers {
            handles: Vec::new(),
            shutdown_tx,
            done_rx,
        };

        let entries: [(&'static str, fn(Arc<Shared>, Receiver<()>, WorkerGuard)); 3] = [
            (REQUEST_WORKER, requests::main),
            (MOVEMENT_WORKER, movement::main),
            (MONITOR_WORKER, monitor::main),
        ];
        for (name, entry) in entries {
            let shared = self.shared.clone();
            let shutdown_rx = shutdown_rx.clone();
            let done_tx = done_tx.clone();
            let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
                let worker = WorkerGuard::new(name, shared.clone(), done_tx);
                entry(shared, shutdown_rx, worker)
            });
            match spawned {
                Ok(handle) => workers.handles.push((name, handle)),
                Err(source) => {
                    self.shared.log(LogLevel::Error, &format!("could not start {name}: {source}"));
                    self.shutdown(workers);
                    *phase = Phase::Stopped;
                    return Err(SimulationError::Spawn { name, source });
                },
            }
        }

        *self.workers.lock() = Some(workers);
        *phase = Phase::Running;
        Ok(())
    }

    /// Stops the workers, waiting up to the grace period for each, then
    /// prints the statistics. Does nothing unless the engine is running.
    pub fn stop_simulation(&self) {
        let mut phase = self.phase.lock();
        if *phase != Phase::Running {
            self.shared.log(LogLevel::Debug, "simulation not running, nothing to stop");
            return;
        }
        if let Some(workers) = self.workers.lock().take() {
            self.shutdown(workers);
        }
        *phase = Phase::Stopped;
        drop(phase);
        self.shared.log(LogLevel::Info, "simulation stopped");
        self.print_statistics();
    }

    fn shutdown(&self, workers: Workers) {
        let Workers {
            handles,
            shutdown_tx,
            done_rx,
        } = workers;
        self.shared.set_running(false);
        // wakes every worker blocked in select!
        drop(shutdown_tx);

        let deadline = Instant::now() + self.shared.timing.grace();
        let mut pending: Vec<&'static str> = handles.iter().map(|(name, _)| *name).collect();
        while !pending.is_empty() {
            match done_rx.recv_deadline(deadline) {
                Ok(name) => pending.retain(|n| *n != name),
                Err(_) => break,
            }
        }

        for (name, handle) in handles {
            if pending.contains(&name) {
                self.shared.log(
                    LogLevel::Error,
                    &format!("{name} did not stop within {:?}, detaching it", self.shared.timing.grace()),
                );
                continue;
            }
            if handle.join().is_err() {
                self.shared.log(LogLevel::Error, &format!("{name} panicked"));
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    pub fn elevator_snapshot(&self) -> ElevatorSnapshot {
        self.shared.state.lock().elevator.snapshot()
    }

    pub fn waiting_passengers(&self) -> Vec<Passenger> {
        self.shared.state.lock().passengers.waiting_passengers()
    }

    pub fn completed_passengers(&self) -> Vec<Passenger> {
        self.shared.state.lock().passengers.completed_passengers().to_vec()
    }

    pub fn ticks(&self) -> u64 {
        self.shared.state.lock().ticks
    }

    /// Summary of the run, or `None` while workers are still going.
    pub fn statistics(&self) -> Option<Statistics> {
        if self.is_running() {
            return None;
        }
        let state = self.shared.state.lock();
        Some(Statistics::collect(
            state.ticks,
            state.passengers.completed_passengers(),
            state.passengers.waiting_count(),
            state.elevator.current_floor(),
        ))
    }

    pub fn print_statistics(&self) -> Option<Statistics> {
        let Some(statistics) = self.statistics() else {
            self.shared.log(LogLevel::Warn, "statistics are only available once the simulation has stopped");
            return None;
        };
        for line in statistics.lines() {
            self.shared.log(LogLevel::Info, &line);
        }
        Some(statistics)
    }
}

impl Drop for ElevatorService {
    fn drop(&mut self) {
        if let Some(workers) = self.workers.get_mut().take() {
            self.shutdown(workers);
        }
    }
}
