use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{select, unbounded};
use tracing_subscriber::EnvFilter;

use shared_resources::config::{ConfigError, SimulationConfig};
use shared_resources::request::PassengerRequest;
use shared_resources::Floor;

use simulator::utilities::debug::Debug;
use simulator::{ElevatorService, FileSink, LogSink, TracingSink, WorkerStatus};

/// Single-car SCAN elevator simulation.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to config.json, then _config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    min_floor: Option<Floor>,

    #[arg(long)]
    max_floor: Option<Floor>,

    #[arg(long)]
    capacity: Option<usize>,

    #[arg(long)]
    start_floor: Option<Floor>,

    /// Movement and monitor tick in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Passenger request as START:DEST, may be repeated
    #[arg(short, long = "request", value_name = "START:DEST")]
    requests: Vec<PassengerRequest>,

    /// Append engine log lines to this file instead of the tracing output
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Redraw a status table in the terminal on every state change
    #[arg(long)]
    dashboard: bool,

    /// Print the final statistics as JSON on stdout
    #[arg(long)]
    json: bool,

    #[arg(long)]
    debug: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig, ConfigError> {
    let mut config = match args.config.clone().or_else(SimulationConfig::find_config_file) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            SimulationConfig::load(&path)?
        },
        None => {
            tracing::info!("no configuration file found, using defaults");
            SimulationConfig::default()
        },
    };

    // COMMAND LINE OVERRIDES
    if let Some(min_floor) = args.min_floor {
        config.elevator.min_floor = min_floor;
    }
    if let Some(max_floor) = args.max_floor {
        config.elevator.max_floor = max_floor;
    }
    if let Some(capacity) = args.capacity {
        config.elevator.capacity = capacity;
    }
    if args.start_floor.is_some() {
        config.elevator.start_floor = args.start_floor;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.timing.tick_ms = tick_ms;
    }
    config.requests.extend(args.requests.iter().copied());

    config.validate()?;
    Ok(config)
}

fn init_tracing(args: &Args) {
    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    // keep stdout free for the dashboard and the JSON summary
    builder.with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    // READ CONFIGURATION
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let log: Arc<dyn LogSink> = match &args.log_file {
        Some(path) => match FileSink::open(path) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                tracing::error!(path = %path.display(), "cannot open log file: {e}");
                return ExitCode::FAILURE;
            },
        },
        None => Arc::new(TracingSink),
    };

    // INITIALIZE ENGINE
    let engine = ElevatorService::new(&config, log);
    let (state_changed_tx, state_changed_rx) = unbounded::<()>();
    let (worker_status_tx, worker_status_rx) = unbounded::<(String, WorkerStatus)>();
    engine.set_state_listener(move || {
        let _ = state_changed_tx.send(());
    });
    engine.set_worker_status_listener(move |name, status| {
        let _ = worker_status_tx.send((name.to_string(), status));
    });

    for request in &config.requests {
        // already validated with the rest of the configuration
        let _ = engine.add_passenger_request(request.start_floor, request.destination_floor);
    }

    if let Err(e) = engine.start_simulation() {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let mut debug = args.dashboard.then(Debug::new);
    let mut workers: Vec<(String, WorkerStatus)> = Vec::new();

    while engine.is_running() {
        select! {
            recv(state_changed_rx) -> _ => {
                // coalesce the burst from all three workers into one redraw
                while state_changed_rx.try_recv().is_ok() {}
            },
            recv(worker_status_rx) -> msg => {
                if let Ok((name, status)) = msg {
                    match workers.iter_mut().find(|(n, _)| *n == name) {
                        Some(entry) => entry.1 = status,
                        None => workers.push((name, status)),
                    }
                }
            },
            default(Duration::from_millis(250)) => (),
        }
        if let Some(dashboard) = debug.as_mut() {
            let completed = engine.completed_passengers().len();
            let drawn = dashboard.printstatus(&engine.elevator_snapshot(), &engine.waiting_passengers(), completed, &workers);
            if let Err(e) = drawn {
                tracing::warn!("dashboard disabled: {e}");
                debug = None;
            }
        }
    }

    engine.clear_listeners();
    engine.stop_simulation();

    if args.json {
        if let Some(statistics) = engine.statistics() {
            match serde_json::to_string_pretty(&statistics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    tracing::error!("could not serialize statistics: {e}");
                    return ExitCode::FAILURE;
                },
            }
        }
    }
    ExitCode::SUCCESS
}
