//! The merge step of a synchronization round.
//!
//! Every worker feeds the contributions of all workers, in rank order, into
//! its own `Consensus` and installs the outcome into its colony. Best cost,
//! stagnation and best tour come out the same on every worker.

use ndarray::Array2;

use crate::{
    colony::Colony,
    error::{ColonyErr, Result},
    matrix::PheromoneMatrix,
    tour::{Best, cost_key},
};

/// What a worker reveals to its peers at the end of a block of iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub rank: usize,
    pub best: Option<Best>,
    pub stagnation: u64,
    /// Pheromone on each edge of `best`, empty when there's no best.
    pub trail: Vec<f64>,
}

impl Contribution {
    pub fn cost(&self) -> Option<u64> {
        self.best.as_ref().map(|best| best.cost)
    }
}

/// Running merge of the contributions received during one round.
#[derive(Debug)]
pub struct Consensus {
    rank: usize,
    // Rank the candidate tour comes from.
    source: usize,
    best: Option<Best>,
    stagnation: u64,
    sums: PheromoneMatrix,
    counts: Array2<u32>,
}

impl Consensus {
    /// Creates a new `Consensus` seeded with the worker's own standing.
    ///
    /// The pheromone accumulator starts from the worker's matrix and every
    /// cell counts as contributed once.
    pub fn new(rank: usize, colony: &Colony) -> Self {
        let cities = colony.pheromones().cities();

        Self {
            rank,
            source: rank,
            best: colony.best().cloned(),
            stagnation: colony.stagnation(),
            sums: colony.pheromones().clone(),
            counts: Array2::ones((cities, cities)),
        }
    }

    pub fn cost(&self) -> Option<u64> {
        self.best.as_ref().map(|best| best.cost)
    }

    pub fn best(&self) -> Option<&Best> {
        self.best.as_ref()
    }

    pub fn stagnation(&self) -> u64 {
        self.stagnation
    }

    /// Merges a peer's contribution, the worker's own one is ignored.
    ///
    /// A strictly cheaper peer replaces the candidate along with its
    /// stagnation counter. An equally good peer adds its counter, and its
    /// tour is kept if it comes from a lower rank. The peer's trail is
    /// accumulated on both directions of each edge of its tour.
    ///
    /// # Errors
    /// Returns an error if the peer's tour or trail don't fit the instance,
    /// in which case nothing is merged.
    pub fn absorb(&mut self, peer: &Contribution) -> Result<()> {
        if peer.rank == self.rank {
            return Ok(());
        }

        self.check(peer)?;

        let (theirs, ours) = (cost_key(peer.cost()), cost_key(self.cost()));
        if theirs < ours {
            self.best = peer.best.clone();
            self.stagnation = peer.stagnation;
            self.source = peer.rank;
        } else if theirs == ours {
            self.stagnation += peer.stagnation;

            if peer.rank < self.source {
                self.best = peer.best.clone();
                self.source = peer.rank;
            }
        }

        if let Some(best) = &peer.best {
            for ((a, b), &value) in best.tour.edges().zip(&peer.trail) {
                self.counts[[a, b]] += 1;
                self.counts[[b, a]] += 1;
                self.sums.accumulate(a, b, value);
                self.sums.accumulate(b, a, value);
            }
        }

        Ok(())
    }

    /// Averages the accumulated pheromones and installs the merged state.
    pub fn finish(self, colony: &mut Colony) {
        let Self {
            mut sums,
            counts,
            best,
            stagnation,
            ..
        } = self;

        sums.average(&counts);
        colony.adopt(sums, best, stagnation);
    }

    fn check(&self, peer: &Contribution) -> Result<()> {
        let cities = self.sums.cities();
        let tour_len = peer.best.as_ref().map_or(0, |best| best.tour.len());

        if peer.best.is_some() && tour_len != cities {
            return Err(ColonyErr::InvalidTour {
                cities,
                detail: format!("rank {} shared {tour_len} cities", peer.rank),
            });
        }

        if peer.trail.len() != tour_len {
            return Err(ColonyErr::TrailLength {
                got: peer.trail.len(),
                expected: tour_len,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{colony::Params, matrix::DistanceMatrix, stream::RandomStream, tour::Tour};

    fn params() -> Params {
        Params::new(1.0, 1.0, 0.5).unwrap()
    }

    fn colony_with(tour: Vec<usize>, cost: u64) -> Colony {
        let mut colony = Colony::new(tour.len(), 1, params());
        colony.offer(Tour::from_cities(tour, 4).unwrap(), cost);
        colony
    }

    fn peer(rank: usize, tour: Vec<usize>, cost: u64, stagnation: u64, trail: f64) -> Contribution {
        Contribution {
            rank,
            best: Some(Best {
                tour: Tour::from_cities(tour, 4).unwrap(),
                cost,
            }),
            stagnation,
            trail: vec![trail; 4],
        }
    }

    #[test]
    fn lone_worker_keeps_its_pheromones() {
        #[rustfmt::skip]
        let d = DistanceMatrix::from_flat(4, vec![
            0, 1, 4, 3,
            1, 0, 2, 5,
            4, 2, 0, 1,
            3, 5, 1, 0,
        ]).unwrap();

        let mut colony = Colony::new(4, 3, params());
        let mut stream = RandomStream::new(vec![3, 14, 15, 92, 65]).unwrap();
        for _ in 0..3 {
            colony.iterate(&d, &mut stream).unwrap();
        }

        let before = colony.clone();
        let mut consensus = Consensus::new(0, &colony);
        consensus.absorb(&colony.contribution(0)).unwrap();
        consensus.finish(&mut colony);

        assert_eq!(colony.pheromones(), before.pheromones());
        assert_eq!(colony.best(), before.best());
        assert_eq!(colony.stagnation(), before.stagnation());
    }

    #[test]
    fn cheaper_peer_wins_without_summing_stagnation() {
        let mut a = colony_with(vec![0, 1, 2, 3], 10);
        let mut b = colony_with(vec![0, 2, 1, 3], 7);
        let contributions = [a.contribution(0), b.contribution(1)];

        for (rank, colony) in [(0, &mut a), (1, &mut b)] {
            let mut consensus = Consensus::new(rank, colony);
            for c in &contributions {
                consensus.absorb(c).unwrap();
            }
            consensus.finish(colony);
        }

        assert_eq!(a.best_cost(), Some(7));
        assert_eq!(b.best_cost(), Some(7));
        assert_eq!(a.stagnation(), b.stagnation());
        assert_eq!(a.best(), b.best());
    }

    #[test]
    fn cheaper_peer_brings_its_own_counter() {
        let own = colony_with(vec![0, 1, 2, 3], 10);
        let mut consensus = Consensus::new(0, &own);

        consensus.absorb(&peer(1, vec![0, 2, 1, 3], 7, 4, 0.2)).unwrap();

        assert_eq!(consensus.cost(), Some(7));
        assert_eq!(consensus.stagnation(), 4);
    }

    #[test]
    fn ties_sum_stagnation_and_prefer_the_lowest_rank() {
        let own = colony_with(vec![0, 1, 2, 3], 7);
        let mut consensus = Consensus::new(2, &own);

        consensus.absorb(&peer(0, vec![3, 2, 1, 0], 7, 5, 0.2)).unwrap();
        consensus.absorb(&peer(1, vec![1, 0, 3, 2], 7, 6, 0.2)).unwrap();
        consensus.absorb(&peer(3, vec![2, 1, 0, 3], 9, 100, 0.2)).unwrap();

        assert_eq!(consensus.cost(), Some(7));
        assert_eq!(consensus.stagnation(), 5 + 6);
        assert_eq!(consensus.best().unwrap().tour.cities(), &[3, 2, 1, 0]);
    }

    #[test]
    fn trails_are_averaged_over_contributors() {
        let mut own = Colony::new(4, 0, params());
        let mut consensus = Consensus::new(0, &own);

        consensus.absorb(&peer(1, vec![0, 1, 2, 3], 7, 0, 0.4)).unwrap();
        consensus.absorb(&peer(2, vec![0, 1, 3, 2], 8, 0, 0.7)).unwrap();
        consensus.finish(&mut own);

        let p = own.pheromones();
        // (0, 1) was on both tours.
        assert_eq!(p.get(0, 1), (0.1 + 0.4 + 0.7) / 3.0);
        assert_eq!(p.get(1, 0), (0.1 + 0.4 + 0.7) / 3.0);
        // (1, 2) only on the first.
        assert_eq!(p.get(1, 2), (0.1 + 0.4) / 2.0);
        // (2, 0) closes the second one.
        assert_eq!(p.get(0, 2), (0.1 + 0.7) / 2.0);
        assert_eq!(own.best_cost(), Some(7));
    }

    #[test]
    fn missing_best_loses_to_any_cost() {
        let own = Colony::new(4, 0, params());
        let mut consensus = Consensus::new(1, &own);

        consensus
            .absorb(&Contribution {
                rank: 0,
                best: None,
                stagnation: 2,
                trail: vec![],
            })
            .unwrap();
        assert_eq!(consensus.cost(), None);

        consensus.absorb(&peer(2, vec![0, 1, 2, 3], 12, 1, 0.1)).unwrap();
        assert_eq!(consensus.cost(), Some(12));
        assert_eq!(consensus.stagnation(), 1);
    }

    #[test]
    fn rejects_mismatched_trail() {
        let own = Colony::new(4, 0, params());
        let mut consensus = Consensus::new(0, &own);
        let mut bad = peer(1, vec![0, 1, 2, 3], 7, 0, 0.1);
        bad.trail.pop();

        let err = consensus.absorb(&bad).unwrap_err();
        assert_eq!(err, ColonyErr::TrailLength { got: 3, expected: 4 });
        assert_eq!(consensus.cost(), None);
    }
}
