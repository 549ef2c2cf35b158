use std::{error::Error, fmt, io};

/// The colony module's result type.
pub type Result<T> = std::result::Result<T, ColonyErr>;

/// Failures of the optimization kernel.
///
/// None of these are recoverable mid-run, a worker that hits one must stop.
#[derive(Debug, Clone, PartialEq)]
pub enum ColonyErr {
    /// The roulette scan ran past the last city without reaching its target.
    NoCandidate { current: usize, target: u64 },
    /// A tour that isn't a permutation of every city.
    InvalidTour { cities: usize, detail: String },
    /// A peer trail whose length doesn't match its tour.
    TrailLength { got: usize, expected: usize },
    /// A run parameter out of its domain.
    InvalidParam { name: &'static str, value: String },
    /// A random stream without values.
    EmptyStream,
}

impl fmt::Display for ColonyErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidate { current, target } => write!(
                f,
                "no next city could be chosen from city {current} for roulette target {target}"
            ),
            Self::InvalidTour { cities, detail } => {
                write!(f, "invalid tour over {cities} cities: {detail}")
            }
            Self::TrailLength { got, expected } => {
                write!(f, "trail length mismatch: got {got}, expected {expected}")
            }
            Self::InvalidParam { name, value } => write!(f, "invalid {name}: {value}"),
            Self::EmptyStream => write!(f, "the random stream is empty"),
        }
    }
}

impl Error for ColonyErr {}

/// Failures while reading the distance or random number files.
#[derive(Debug)]
pub enum LoadErr {
    Io(io::Error),
    /// The input ended before `what` could be read.
    Missing { what: String },
    /// A token that isn't a valid `what`.
    Invalid { what: String, token: String },
    /// A count that must be positive was zero.
    Empty { what: &'static str },
    /// Two distinct cities with no distance between them.
    ZeroDistance { row: usize, col: usize },
}

impl fmt::Display for LoadErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Missing { what } => write!(f, "unexpected end of input, missing {what}"),
            Self::Invalid { what, token } => write!(f, "invalid {what}: {token:?}"),
            Self::Empty { what } => write!(f, "{what} must be positive"),
            Self::ZeroDistance { row, col } => {
                write!(f, "distance between cities {row} and {col} is zero")
            }
        }
    }
}

impl Error for LoadErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
