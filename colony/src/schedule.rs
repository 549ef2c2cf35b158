use crate::termination::StagnationBudget;

/// Splits `ants` as evenly as possible, the first `ants % workers` workers
/// get one extra.
///
/// # Panics
/// If `workers` is zero.
pub fn partition(ants: usize, workers: usize) -> Vec<usize> {
    let (share, extra) = (ants / workers, ants % workers);
    (0..workers)
        .map(|rank| share + usize::from(rank < extra))
        .collect()
}

/// Who runs how many ants, and how far each worker's stream cursor moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    ants: Vec<usize>,
    cities: usize,
    external: u64,
    on_node: u64,
}

impl Schedule {
    /// Creates a new `Schedule`.
    ///
    /// # Arguments
    /// * `ants` - The amount of ants of each worker, indexed by rank.
    /// * `cities` - The amount of cities of the instance.
    /// * `external` - The amount of synchronization rounds.
    /// * `on_node` - The amount of local iterations per round.
    pub fn new(ants: Vec<usize>, cities: usize, external: u64, on_node: u64) -> Self {
        Self {
            ants,
            cities,
            external,
            on_node,
        }
    }

    pub fn workers(&self) -> usize {
        self.ants.len()
    }

    pub fn ants(&self) -> &[usize] {
        &self.ants
    }

    /// Returns the amount of ants `rank` runs, zero for unknown ranks.
    pub fn ants_of(&self, rank: usize) -> usize {
        self.ants.get(rank).copied().unwrap_or_default()
    }

    pub fn total_ants(&self) -> usize {
        self.ants.iter().sum()
    }

    pub fn cities(&self) -> usize {
        self.cities
    }

    pub fn external(&self) -> u64 {
        self.external
    }

    pub fn on_node(&self) -> u64 {
        self.on_node
    }

    pub fn budget(&self) -> StagnationBudget {
        StagnationBudget::new(self.total_ants(), self.external, self.on_node)
    }

    /// Stream values consumed per round by the ants of lower ranks.
    pub fn initial_offset(&self, rank: usize) -> u128 {
        let before: usize = self.ants.iter().take(rank).sum();
        self.values_for(before)
    }

    /// Stream values consumed per round by every other worker.
    pub fn round_skip(&self, rank: usize) -> u128 {
        self.values_for(self.total_ants() - self.ants_of(rank))
    }

    fn values_for(&self, ants: usize) -> u128 {
        u128::from(self.on_node) * ants as u128 * self.cities as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_lowest_ranks() {
        assert_eq!(partition(10, 3), vec![4, 3, 3]);
        assert_eq!(partition(11, 3), vec![4, 4, 3]);
        assert_eq!(partition(9, 3), vec![3, 3, 3]);
        assert_eq!(partition(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(partition(5, 1), vec![5]);
    }

    #[test]
    fn offsets_follow_lower_ranks() {
        let schedule = Schedule::new(partition(10, 3), 5, 4, 2);

        assert_eq!(schedule.initial_offset(0), 0);
        assert_eq!(schedule.initial_offset(1), 2 * 4 * 5);
        assert_eq!(schedule.initial_offset(2), 2 * 7 * 5);
    }

    #[test]
    fn skips_cover_the_other_workers() {
        let schedule = Schedule::new(partition(10, 3), 5, 4, 2);

        assert_eq!(schedule.round_skip(0), 2 * 6 * 5);
        assert_eq!(schedule.round_skip(1), 2 * 7 * 5);
        assert_eq!(schedule.round_skip(2), 2 * 7 * 5);
    }

    #[test]
    fn lone_worker_never_skips() {
        let schedule = Schedule::new(vec![8], 6, 3, 2);

        assert_eq!(schedule.initial_offset(0), 0);
        assert_eq!(schedule.round_skip(0), 0);
        assert_eq!(schedule.budget().limit(), 20);
    }
}
