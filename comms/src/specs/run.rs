use serde::{Deserialize, Serialize};

/// The specification for the colony parameters shared by every worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsSpec {
    pub external_iterations: u64,
    pub on_node_iterations: u64,
    pub alpha: f64,
    pub beta: f64,
    pub evaporation: f64,
}

/// Wire-level bootstrap specification for a single worker.
///
/// Sent by the coordinator right after a member joins, it's followed by the
/// distance matrix and the random stream as data payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Rank assigned to the receiving worker.
    pub rank: usize,
    /// Total amount of workers taking part in the run.
    pub workers: usize,
    /// Side of the distance matrix.
    pub cities: usize,
    /// Length of the random stream.
    pub randoms: usize,
    /// Ants owned by each worker, indexed by rank.
    pub ants: Vec<usize>,
    pub params: ParamsSpec,
}
