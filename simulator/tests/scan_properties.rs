use proptest::prelude::*;

use shared_resources::direction::Direction;
use simulator::utilities::elevator::Elevator;

fn elevator_at(floor: i32, requests: &[i32]) -> Elevator {
    let mut elevator = Elevator::new(1, 20, 5);
    elevator.set_current_floor(floor);
    for &request in requests {
        elevator.add_request(request);
    }
    elevator
}

proptest! {
    #[test]
    fn upward_sweep_never_goes_below(floor in 1..=20, requests in prop::collection::vec(1..=20, 0..12)) {
        let mut elevator = elevator_at(floor, &requests);
        elevator.set_direction(Direction::Up);
        if requests.iter().any(|&r| r > floor) {
            let next = elevator.next_destination();
            prop_assert!(matches!(next, Some(target) if target > floor));
            prop_assert_eq!(elevator.direction(), Direction::Up);
        }
    }

    #[test]
    fn downward_sweep_never_goes_above(floor in 1..=20, requests in prop::collection::vec(1..=20, 0..12)) {
        let mut elevator = elevator_at(floor, &requests);
        elevator.set_direction(Direction::Down);
        if requests.iter().any(|&r| r < floor) {
            let next = elevator.next_destination();
            prop_assert!(matches!(next, Some(target) if target < floor));
        }
    }

    #[test]
    fn added_requests_are_pending_unless_current(floor in 1..=20, request in 1..=20) {
        let mut elevator = elevator_at(floor, &[]);
        let added = elevator.add_request(request);
        prop_assert_eq!(added, request != floor);
        prop_assert_eq!(elevator.has_request_at(request), request != floor);
    }

    #[test]
    fn sweeping_serves_every_request(floor in 1..=20, requests in prop::collection::vec(1..=20, 1..12)) {
        let mut elevator = elevator_at(floor, &requests);
        let mut steps = 0;
        while let Some(target) = elevator.next_destination() {
            let before = elevator.current_floor();
            match elevator.advance_toward(target) {
                Some(after) => prop_assert_eq!((after - before).abs(), 1),
                None => {
                    elevator.remove_request(target);
                }
            }
            if elevator.has_request_at(elevator.current_floor()) {
                elevator.remove_request(elevator.current_floor());
            }
            steps += 1;
            // two full sweeps at most
            prop_assert!(steps <= 40);
        }
        prop_assert!(!elevator.has_requests());
    }
}
