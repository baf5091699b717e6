pub mod debug;
pub mod elevator;
pub mod log_sink;
pub mod passenger_service;
pub mod statistics;
