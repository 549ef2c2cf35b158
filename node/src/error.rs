use std::{error::Error, fmt, io};

use colony::{ColonyErr, LoadErr};
use comms::msg::Msg;

/// The node module's result type.
pub type Result<T> = std::result::Result<T, NodeErr>;

/// Failures of a distributed run.
///
/// Every one of them is fatal for the whole run, workers can't recover from
/// a diverged state.
#[derive(Debug)]
pub enum NodeErr {
    Io(io::Error),
    Colony(ColonyErr),
    Load(LoadErr),
    UnexpectedMessage {
        phase: &'static str,
        got: &'static str,
    },
    PayloadLength {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    RankMismatch {
        expected: usize,
        got: usize,
    },
    InvalidSetup(String),
    /// A peer reported a failure of its own.
    Peer {
        rank: usize,
        detail: String,
    },
}

impl NodeErr {
    pub(crate) fn unexpected(phase: &'static str, msg: &Msg<'_>) -> Self {
        Self::UnexpectedMessage {
            phase,
            got: msg.kind(),
        }
    }
}

impl fmt::Display for NodeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeErr::Io(e) => write!(f, "io error: {e}"),
            NodeErr::Colony(e) => write!(f, "colony error: {e}"),
            NodeErr::Load(e) => write!(f, "load error: {e}"),
            NodeErr::UnexpectedMessage { phase, got } => {
                write!(f, "unexpected message during {phase}: got {got}")
            }
            NodeErr::PayloadLength {
                what,
                got,
                expected,
            } => write!(f, "{what} length mismatch: got {got}, expected {expected}"),
            NodeErr::RankMismatch { expected, got } => {
                write!(f, "rank mismatch: got {got}, expected {expected}")
            }
            NodeErr::InvalidSetup(detail) => write!(f, "invalid setup: {detail}"),
            NodeErr::Peer { rank, detail } => write!(f, "worker {rank} failed: {detail}"),
        }
    }
}

impl Error for NodeErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NodeErr::Io(e) => Some(e),
            NodeErr::Colony(e) => Some(e),
            NodeErr::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NodeErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ColonyErr> for NodeErr {
    fn from(value: ColonyErr) -> Self {
        Self::Colony(value)
    }
}

impl From<LoadErr> for NodeErr {
    fn from(value: LoadErr) -> Self {
        Self::Load(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<NodeErr> for io::Error {
    fn from(value: NodeErr) -> Self {
        match value {
            NodeErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
