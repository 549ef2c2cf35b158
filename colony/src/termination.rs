/// Early stop rule of the outer loop.
///
/// The run stops once the merged stagnation counter reaches 40% of the total
/// ant-iterations of the whole run, rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagnationBudget {
    limit: u128,
}

impl StagnationBudget {
    /// Creates a new `StagnationBudget`.
    ///
    /// # Arguments
    /// * `total_ants` - The amount of ants across every worker.
    /// * `external` - The amount of synchronization rounds.
    /// * `on_node` - The amount of local iterations per round.
    pub fn new(total_ants: usize, external: u64, on_node: u64) -> Self {
        let work = total_ants as u128 * u128::from(external) * u128::from(on_node);

        // ceil(2w / 5) without overflowing on 2w.
        let limit = work / 5 * 2 + (work % 5 * 2).div_ceil(5);

        Self { limit }
    }

    pub fn limit(&self) -> u128 {
        self.limit
    }

    /// Whether a counter at `stagnation` stops the run.
    pub fn exhausted(&self, stagnation: u64) -> bool {
        u128::from(stagnation) >= self.limit
    }
}
