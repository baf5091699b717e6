/// ----- SHARED STATE -----
/// Everything the three workers touch. The elevator and the passenger
/// service sit behind one lock; every read-then-write goes through it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use shared_resources::config::TimingConfig;
use shared_resources::Floor;

use crate::utilities::elevator::Elevator;
use crate::utilities::log_sink::{LogLevel, LogSink};
use crate::utilities::passenger_service::PassengerService;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Starting,
    Running,
    Waiting,
    Stopped,
}

impl WorkerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerStatus::Starting => "starting",
            WorkerStatus::Running => "running",
            WorkerStatus::Waiting => "waiting",
            WorkerStatus::Stopped => "stopped",
        }
    }
}

pub type WorkerStatusListener = Arc<dyn Fn(&str, WorkerStatus) + Send + Sync>;
pub type StateListener = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct SimulationState {
    pub(crate) elevator: Elevator,
    pub(crate) passengers: PassengerService,
    pub(crate) ticks: u64,
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<SimulationState>,
    pub(crate) running: AtomicBool,
    pub(crate) request_rx: Receiver<Floor>,
    pub(crate) timing: TimingConfig,
    log: Arc<dyn LogSink>,
    worker_status_listener: RwLock<Option<WorkerStatusListener>>,
    state_listener: RwLock<Option<StateListener>>,
}

impl Shared {
    pub(crate) fn new(
        state: SimulationState,
        request_rx: Receiver<Floor>,
        timing: TimingConfig,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Shared {
            state: Mutex::new(state),
            running: AtomicBool::new(false),
            request_rx,
            timing,
            log,
            worker_status_listener: RwLock::new(None),
            state_listener: RwLock::new(None),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        self.log.log(level, message);
    }

    pub(crate) fn sink(&self) -> &dyn LogSink {
        &*self.log
    }

    pub(crate) fn set_worker_status_listener(&self, listener: Option<WorkerStatusListener>) {
        *self.worker_status_listener.write() = listener;
    }

    pub(crate) fn set_state_listener(&self, listener: Option<StateListener>) {
        *self.state_listener.write() = listener;
    }

    pub(crate) fn publish_status(&self, worker: &str, status: WorkerStatus) {
        let listener = self.worker_status_listener.read().clone();
        if let Some(listener) = listener {
            self.call_listener("worker status", || listener(worker, status));
        }
    }

    /// Must not be called while holding `state`.
    pub(crate) fn notify_state_changed(&self) {
        let listener = self.state_listener.read().clone();
        if let Some(listener) = listener {
            self.call_listener("elevator state", || listener());
        }
    }

    fn call_listener(&self, kind: &str, call: impl FnOnce()) {
        if panic::catch_unwind(AssertUnwindSafe(call)).is_err() {
            self.log(LogLevel::Warn, &format!("{kind} listener panicked, ignoring it"));
        }
    }
}

/// Held by each worker thread for its whole life. Publishes status changes
/// and reports the exit, also when the worker unwinds.
pub(crate) struct WorkerGuard {
    name: &'static str,
    status: WorkerStatus,
    shared: Arc<Shared>,
    done_tx: Sender<&'static str>,
}

impl WorkerGuard {
    pub(crate) fn new(name: &'static str, shared: Arc<Shared>, done_tx: Sender<&'static str>) -> Self {
        shared.publish_status(name, WorkerStatus::Starting);
        WorkerGuard {
            name,
            status: WorkerStatus::Starting,
            shared,
            done_tx,
        }
    }

    pub(crate) fn set_status(&mut self, status: WorkerStatus) {
        if self.status != status {
            self.status = status;
            self.shared.publish_status(self.name, status);
        }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.set_status(WorkerStatus::Stopped);
        self.shared.log(LogLevel::Info, &format!("{} stopped", self.name));
        // the engine may already have given up on us
        let _ = self.done_tx.send(self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    use crate::utilities::log_sink::RecordingSink;

    fn shared_with(sink: Arc<RecordingSink>) -> Arc<Shared> {
        let (_request_tx, request_rx) = unbounded();
        let state = SimulationState {
            elevator: Elevator::new(1, 5, 2),
            passengers: PassengerService::new(sink.clone()),
            ticks: 0,
        };
        Arc::new(Shared::new(state, request_rx, TimingConfig::default(), sink))
    }

    #[test]
    fn guard_publishes_changes_and_exit() {
        let sink = Arc::new(RecordingSink::new());
        let shared = shared_with(sink.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            shared.set_worker_status_listener(Some(Arc::new(move |name: &str, status: WorkerStatus| {
                seen.lock().push((name.to_string(), status));
            })));
        }
        let (done_tx, done_rx) = unbounded();
        {
            let mut guard = WorkerGuard::new("worker", shared.clone(), done_tx);
            guard.set_status(WorkerStatus::Running);
            guard.set_status(WorkerStatus::Running);
            guard.set_status(WorkerStatus::Waiting);
        }
        let statuses: Vec<WorkerStatus> = seen.lock().iter().map(|(_, s)| *s).collect();
        assert_eq!(
            statuses,
            vec![WorkerStatus::Starting, WorkerStatus::Running, WorkerStatus::Waiting, WorkerStatus::Stopped]
        );
        assert_eq!(done_rx.try_recv(), Ok("worker"));
        assert!(sink.contains(LogLevel::Info, "worker stopped"));
    }

    #[test]
    fn panicking_listener_is_contained() {
        let sink = Arc::new(RecordingSink::new());
        let shared = shared_with(sink.clone());
        shared.set_state_listener(Some(Arc::new(|| panic!("view crashed"))));
        shared.notify_state_changed();
        assert!(sink.contains(LogLevel::Warn, "elevator state listener panicked"));
    }
}
