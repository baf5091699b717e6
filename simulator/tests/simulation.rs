use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use shared_resources::config::{ElevatorConfig, SimulationConfig, TimingConfig};
use shared_resources::direction::Direction;
use shared_resources::passenger::PassengerId;
use shared_resources::request::RequestError;
use shared_resources::Floor;

use simulator::{ElevatorService, LogLevel, Phase, RecordingSink, WorkerStatus};

fn engine(start_floor: Floor, capacity: usize, tick_ms: u64) -> (ElevatorService, Arc<RecordingSink>) {
    let config = SimulationConfig {
        elevator: ElevatorConfig {
            start_floor: Some(start_floor),
            ..ElevatorConfig::new(1, 10, capacity)
        },
        timing: TimingConfig {
            tick_ms,
            poll_ms: 5,
            grace_ms: 500,
        },
        requests: Vec::new(),
    };
    let sink = Arc::new(RecordingSink::new());
    (ElevatorService::new(&config, sink.clone()), sink)
}

fn wait_until_finished(engine: &ElevatorService) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while engine.is_running() {
        assert!(Instant::now() < deadline, "simulation did not finish in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn single_passenger_is_carried_up() {
    let (engine, sink) = engine(1, 5, 10);
    let id = engine.add_passenger_request(3, 7).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    let completed = engine.completed_passengers();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id(), id);
    let snapshot = engine.elevator_snapshot();
    assert_eq!(snapshot.floor, 7);
    assert!(snapshot.requests.is_empty());
    assert_eq!(snapshot.direction, Direction::Idle);
    assert!(sink.contains(LogLevel::Info, "moved 2 -> 3 (up)"));
    assert!(sink.contains(LogLevel::Info, "moved 6 -> 7 (up)"));
    assert!(sink.contains(LogLevel::Info, "simulation complete"));
    assert_eq!(engine.phase(), Phase::Stopped);
}

#[test]
fn tie_at_start_floor_serves_lower_floor_first() {
    let (engine, sink) = engine(5, 5, 10);
    let down = engine.add_passenger_request(5, 1).unwrap();
    let up = engine.add_passenger_request(5, 9).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    let order: Vec<PassengerId> = engine.completed_passengers().iter().map(|p| p.id()).collect();
    assert_eq!(order, vec![down, up]);
    assert_eq!(engine.elevator_snapshot().floor, 9);
    let first_move = sink
        .messages_at(LogLevel::Info)
        .into_iter()
        .find(|message| message.starts_with("moved"));
    assert_eq!(first_move.as_deref(), Some("moved 5 -> 4 (down)"));
}

#[test]
fn same_floor_request_is_rejected_without_side_effects() {
    let (engine, sink) = engine(1, 5, 10);
    assert_eq!(engine.add_passenger_request(4, 4), Err(RequestError::SameFloor(4)));
    assert!(engine.waiting_passengers().is_empty());
    assert!(engine.elevator_snapshot().requests.is_empty());
    assert_eq!(sink.messages_at(LogLevel::Warn).len(), 1);
}

#[test]
fn stop_returns_promptly_during_a_long_tick() {
    let (engine, _sink) = engine(1, 5, 5_000);
    engine.add_passenger_request(2, 9).unwrap();
    engine.start_simulation().unwrap();
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    engine.stop_simulation();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!engine.is_running());
    let statistics = engine.print_statistics().unwrap();
    assert_eq!(statistics.waiting_passengers, 1);
    assert_eq!(statistics.completed_passengers, 0);
}

#[test]
fn stopping_twice_gives_the_same_statistics() {
    let (engine, _sink) = engine(1, 5, 10);
    engine.add_passenger_request(2, 4).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();
    let first = engine.statistics().unwrap();
    engine.stop_simulation();
    assert_eq!(engine.statistics().unwrap(), first);
    assert_eq!(first.completed_passengers, 1);
    assert_eq!(first.final_floor, 4);
    assert_eq!(engine.ticks(), first.total_ticks);
}

#[test]
fn starting_twice_keeps_one_set_of_workers() {
    let (engine, _sink) = engine(1, 5, 10);
    let starts = Arc::new(AtomicUsize::new(0));
    {
        let starts = starts.clone();
        engine.set_worker_status_listener(move |_name, status| {
            if status == WorkerStatus::Starting {
                starts.fetch_add(1, Ordering::SeqCst);
            }
        });
    }
    engine.add_passenger_request(1, 3).unwrap();
    engine.start_simulation().unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();
    assert_eq!(starts.load(Ordering::SeqCst), 3);
}

#[test]
fn finished_run_restarts_for_new_requests() {
    let (engine, sink) = engine(1, 5, 10);
    engine.add_passenger_request(2, 4).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    assert_eq!(engine.completed_passengers().len(), 1);

    engine.add_passenger_request(3, 6).unwrap();
    engine.start_simulation().unwrap();
    assert!(engine.is_running());
    wait_until_finished(&engine);
    engine.stop_simulation();

    assert_eq!(engine.completed_passengers().len(), 2);
    assert!(engine.waiting_passengers().is_empty());
    assert_eq!(engine.elevator_snapshot().floor, 6);
    assert!(sink.contains(LogLevel::Info, "restarting simulation"));
    assert!(!sink.contains(LogLevel::Debug, "simulation already running"));
}

#[test]
fn stopped_engine_runs_again_on_start() {
    let (engine, _sink) = engine(1, 5, 10);
    engine.add_passenger_request(1, 2).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();
    assert_eq!(engine.phase(), Phase::Stopped);

    engine.add_passenger_request(2, 5).unwrap();
    engine.start_simulation().unwrap();
    assert_eq!(engine.phase(), Phase::Running);
    wait_until_finished(&engine);
    engine.stop_simulation();
    assert_eq!(engine.completed_passengers().len(), 2);
    assert_eq!(engine.statistics().unwrap().final_floor, 5);
}

#[test]
fn created_engine_with_zero_capacity_still_finishes() {
    let engine = ElevatorService::create(1, 10, 0);
    engine.add_passenger_request(1, 2).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    assert_eq!(engine.completed_passengers().len(), 1);
    assert_eq!(engine.elevator_snapshot().capacity, 1);
}

#[test]
fn listeners_see_every_worker_stop() {
    let (engine, _sink) = engine(1, 5, 10);
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let state_changes = Arc::new(AtomicUsize::new(0));
    {
        let statuses = statuses.clone();
        engine.set_worker_status_listener(move |name, status| statuses.lock().push((name.to_string(), status)));
        let state_changes = state_changes.clone();
        engine.set_state_listener(move || {
            state_changes.fetch_add(1, Ordering::SeqCst);
        });
    }
    engine.add_passenger_request(2, 3).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    assert!(state_changes.load(Ordering::SeqCst) > 0);
    let statuses = statuses.lock();
    for worker in [simulator::modules::REQUEST_WORKER, simulator::modules::MOVEMENT_WORKER, simulator::modules::MONITOR_WORKER] {
        let seen: Vec<WorkerStatus> = statuses.iter().filter(|(n, _)| n == worker).map(|(_, s)| *s).collect();
        assert_eq!(seen.first(), Some(&WorkerStatus::Starting), "{worker}");
        assert_eq!(seen.last(), Some(&WorkerStatus::Stopped), "{worker}");
        assert!(seen.windows(2).all(|pair| pair[0] != pair[1]), "{worker} republished a status");
    }
}

#[test]
fn panicking_listener_does_not_stop_the_run() {
    let (engine, sink) = engine(1, 5, 10);
    engine.set_state_listener(|| panic!("renderer crashed"));
    engine.add_passenger_request(3, 5).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    assert_eq!(engine.completed_passengers().len(), 1);
    assert!(sink.contains(LogLevel::Warn, "listener panicked"));
}

#[test]
fn opposite_passengers_on_one_floor_are_both_served() {
    let (engine, _sink) = engine(1, 5, 10);
    engine.add_passenger_request(5, 8).unwrap();
    engine.add_passenger_request(5, 2).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    assert_eq!(engine.completed_passengers().len(), 2);
    assert!(engine.waiting_passengers().is_empty());
    assert_eq!(engine.elevator_snapshot().floor, 2);
}

#[test]
fn car_turns_around_for_a_lone_down_passenger() {
    let (engine, sink) = engine(1, 5, 10);
    engine.add_passenger_request(3, 1).unwrap();
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    assert_eq!(engine.completed_passengers().len(), 1);
    assert_eq!(engine.elevator_snapshot().floor, 1);
    assert!(sink.contains(LogLevel::Info, "direction change: up -> down"));
}

#[test]
fn full_car_comes_back_for_the_rest() {
    let (engine, _sink) = engine(1, 1, 10);
    for destination in [4, 6, 8] {
        engine.add_passenger_request(2, destination).unwrap();
    }
    engine.start_simulation().unwrap();
    wait_until_finished(&engine);
    engine.stop_simulation();

    let completed = engine.completed_passengers();
    assert_eq!(completed.len(), 3);
    for passenger in &completed {
        let boarded = passenger.boarding_time().unwrap();
        let arrived = passenger.arrival_time().unwrap();
        assert!(passenger.request_time() <= boarded && boarded <= arrived);
    }
}
