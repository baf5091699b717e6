use std::fmt;

use shared_resources::passenger::Passenger;
use shared_resources::Floor;

/// Summary of a finished run.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_ticks: u64,
    pub completed_passengers: usize,
    pub waiting_passengers: usize,
    /// Mean over completed passengers, in seconds. `None` when nobody finished.
    pub average_waiting_secs: Option<f64>,
    pub average_total_secs: Option<f64>,
    pub final_floor: Floor,
}

impl Statistics {
    pub fn collect(total_ticks: u64, completed: &[Passenger], waiting_passengers: usize, final_floor: Floor) -> Self {
        Statistics {
            total_ticks,
            completed_passengers: completed.len(),
            waiting_passengers,
            average_waiting_secs: mean(completed.iter().map(|p| p.waiting_time().as_secs_f64())),
            average_total_secs: mean(completed.iter().map(|p| p.total_time().as_secs_f64())),
            final_floor,
        }
    }

    /// Report lines, in the order they are logged.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            String::from("=== run statistics ==="),
            format!("total ticks: {}", self.total_ticks),
            format!("completed passengers: {}", self.completed_passengers),
            format!("waiting passengers: {}", self.waiting_passengers),
        ];
        if let (Some(waiting), Some(total)) = (self.average_waiting_secs, self.average_total_secs) {
            lines.push(format!("average waiting time: {waiting:.1}s"));
            lines.push(format!("average total time: {total:.1}s"));
        }
        lines.push(format!("final elevator floor: {}", self.final_floor));
        lines
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}
