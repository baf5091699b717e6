pub mod modules;
pub mod utilities;

pub use modules::{ElevatorService, Phase, SimulationError, WorkerStatus};
pub use utilities::log_sink::{ConsoleSink, FileSink, LogLevel, LogSink, RecordingSink, TracingSink};
pub use utilities::statistics::Statistics;
