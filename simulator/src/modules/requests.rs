/// ----- REQUEST MODULE -----
/// Takes floor tokens off the inbound channel and adds them to the car's
/// request set. The receive is bounded so a stop is noticed within one poll.

use std::sync::Arc;

use crossbeam_channel::{select, Receiver};

use crate::modules::shared::{Shared, WorkerGuard, WorkerStatus};
use crate::utilities::log_sink::LogLevel;

pub(crate) fn main(shared: Arc<Shared>, shutdown_rx: Receiver<()>, mut worker: WorkerGuard) {
    shared.log(LogLevel::Info, "request processor started");
    worker.set_status(WorkerStatus::Running);

    while shared.is_running() {
        select! {
            recv(shared.request_rx) -> msg => {
                let floor = match msg {
                    Ok(floor) => floor,
                    Err(_) => break,
                };
                worker.set_status(WorkerStatus::Running);
                let added = shared.state.lock().elevator.add_request(floor);
                if added {
                    shared.log(LogLevel::Debug, &format!("request handled: floor {floor}"));
                } else {
                    shared.log(LogLevel::Debug, &format!("request for floor {floor} already pending or served"));
                }
                shared.notify_state_changed();
            },
            recv(shutdown_rx) -> _ => break,
            default(shared.timing.poll()) => {
                worker.set_status(WorkerStatus::Waiting);
            },
        }
    }
}
