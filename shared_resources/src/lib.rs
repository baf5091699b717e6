//! Value types shared between the dispatch engine and the programs driving it.

pub mod config;
pub mod direction;
pub mod elevator_snapshot;
pub mod passenger;
pub mod request;

/// A floor number. Buildings may have basements, so floors are signed.
pub type Floor = i32;
