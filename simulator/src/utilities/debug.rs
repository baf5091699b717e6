/// ----- DEBUG DASHBOARD -----
/// Redraws a status table in the terminal: one row per floor with the car
/// position, pending requests and waiting passengers, then the car state.

use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand};

use shared_resources::elevator_snapshot::ElevatorSnapshot;
use shared_resources::passenger::Passenger;

use crate::modules::WorkerStatus;

pub struct Debug {
    stdout: Stdout,
    lines_drawn: u16,
}

impl Debug {
    pub fn new() -> Self {
        Debug {
            stdout: stdout(),
            lines_drawn: 0,
        }
    }

    pub fn printstatus(
        &mut self,
        snapshot: &ElevatorSnapshot,
        waiting: &[Passenger],
        completed: usize,
        workers: &[(String, WorkerStatus)],
    ) -> std::io::Result<()> {
        if self.lines_drawn > 0 {
            self.stdout.execute(cursor::MoveUp(self.lines_drawn))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

        let lines = render(snapshot, waiting, completed, workers);
        for line in &lines {
            writeln!(self.stdout, "{line}")?;
        }
        self.stdout.flush()?;
        self.lines_drawn = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        Ok(())
    }
}

impl Default for Debug {
    fn default() -> Self {
        Self::new()
    }
}

fn render(
    snapshot: &ElevatorSnapshot,
    waiting: &[Passenger],
    completed: usize,
    workers: &[(String, WorkerStatus)],
) -> Vec<String> {
    let mut lines = vec![
        String::from("+------------+------------+------------+------------+"),
        format!("| {0:<10} | {1:<10} | {2:<10} | {3:<10} |", "FLOOR", "CAR", "REQUESTED", "WAITING"),
    ];
    for floor in (snapshot.min_floor..=snapshot.max_floor).rev() {
        let car = if floor == snapshot.floor { "[##]" } else { "" };
        let requested = if snapshot.has_request_at(floor) { "x" } else { "" };
        let waiting_here = waiting.iter().filter(|p| p.start_floor() == floor).count();
        lines.push(String::from("+------------+------------+------------+------------+"));
        lines.push(format!("| {0:<10} | {1:<10} | {2:<10} | {3:<10} |", floor, car, requested, waiting_here));
    }
    lines.push(String::from("+------------+------------+------------+------------+"));
    lines.push(String::new());
    lines.push(String::from("+-------------------------+"));
    lines.push(format!("| {0:<10} | {1:<10} |", "ELEVATOR", snapshot.id));
    lines.push(String::from("+------------+------------+"));
    lines.push(format!("| {0:<10} | {1:<10} |", "FLOOR", snapshot.floor));
    lines.push(format!("| {0:<10} | {1:<10} |", "DIRECTION", snapshot.direction.as_str()));
    lines.push(format!(
        "| {0:<10} | {1:<10} |",
        "LOAD",
        format!("{}/{}", snapshot.passenger_count, snapshot.capacity)
    ));
    lines.push(format!("| {0:<10} | {1:<10} |", "COMPLETED", completed));
    lines.push(String::from("+------------+------------+"));
    for (name, status) in workers {
        lines.push(format!("| {0:<10} | {1:<10} |", truncate(name, 10), status.as_str()));
    }
    if !workers.is_empty() {
        lines.push(String::from("+------------+------------+"));
    }
    lines
}

fn truncate(name: &str, width: usize) -> &str {
    match name.char_indices().nth(width) {
        Some((index, _)) => &name[..index],
        None => name,
    }
}
