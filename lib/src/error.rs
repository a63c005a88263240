//! All kinds of errors in this crate.

use crate::cells::Dimensions;
use ca_rules::ParseRuleError;
use displaydoc::Display;
use thiserror::Error;

/// All kinds of errors in this crate.
///
/// None of them is fatal: an operation that returns an error leaves
/// the grid, the rules and the scheduler exactly as they were.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Invalid character {0:?} in a rule: only digits are allowed.
    InvalidRuleChar(char),
    /// Invalid neighbor count {0}: a cell has at most 8 neighbors.
    InvalidNeighborCount(u32),
    /// Invalid rule: {0:?}.
    ParseRuleError(#[from] ParseRuleError),
    /// Invalid generation interval {0:?}: it should be a positive number of milliseconds.
    InvalidInterval(String),
    /// Invalid density {0:?}: it should be strictly between 0 and 1.
    InvalidDensity(String),
    /// Unsupported cell size {0:?}: it should be one of 64, 32, 16, 8 or 4.
    InvalidCellSize(String),
    /// The panel ({0} x {1} pixels) is too small: both sides should be at least 64 pixels.
    ExtentTooSmall(u32, u32),
    /// The loaded grid {0:?} does not match any supported grid size.
    SizeMismatch(Dimensions),
    /// Unable to read the saved grid: {0}.
    Deserialize(String),
    /// I/O error: {0}.
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Deserialize(e.to_string())
    }
}
