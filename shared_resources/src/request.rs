use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Floor;

/// Why a transport request was turned away at intake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("start and destination are both floor {0}")]
    SameFloor(Floor),
    #[error("floor {floor} is outside the served range {min_floor}..={max_floor}")]
    OutOfRange {
        floor: Floor,
        min_floor: Floor,
        max_floor: Floor,
    },
    #[error("cannot parse request {0:?}, expected START:DEST")]
    Malformed(String),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "(Floor, Floor)", into = "(Floor, Floor)")]
pub struct PassengerRequest {
    pub start_floor: Floor,
    pub destination_floor: Floor,
}

impl PassengerRequest {
    pub fn new(start_floor: Floor, destination_floor: Floor) -> Self {
        PassengerRequest { start_floor, destination_floor }
    }

    /// Intake rule: start and destination differ and both lie in `min_floor..=max_floor`.
    pub fn validate(&self, min_floor: Floor, max_floor: Floor) -> Result<(), RequestError> {
        if self.start_floor == self.destination_floor {
            return Err(RequestError::SameFloor(self.start_floor));
        }
        for floor in [self.start_floor, self.destination_floor] {
            if floor < min_floor || floor > max_floor {
                return Err(RequestError::OutOfRange { floor, min_floor, max_floor });
            }
        }
        Ok(())
    }
}

impl From<(Floor, Floor)> for PassengerRequest {
    fn from((start_floor, destination_floor): (Floor, Floor)) -> Self {
        PassengerRequest::new(start_floor, destination_floor)
    }
}

impl From<PassengerRequest> for (Floor, Floor) {
    fn from(request: PassengerRequest) -> Self {
        (request.start_floor, request.destination_floor)
    }
}

impl FromStr for PassengerRequest {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RequestError::Malformed(s.to_string());
        let (start, destination) = s.split_once(':').ok_or_else(malformed)?;
        let start_floor = start.trim().parse().map_err(|_| malformed())?;
        let destination_floor = destination.trim().parse().map_err(|_| malformed())?;
        Ok(PassengerRequest::new(start_floor, destination_floor))
    }
}

impl fmt::Display for PassengerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_floor, self.destination_floor)
    }
}
