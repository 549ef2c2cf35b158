use log::trace;

use crate::{
    consensus::Contribution,
    construct::construct,
    error::{ColonyErr, Result},
    matrix::{DistanceMatrix, PheromoneMatrix},
    stream::RandomStream,
    tour::{Best, Tour, improves},
};

/// Exponents and decay shared by every ant of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Weight of the inverse distance.
    pub alpha: f64,
    /// Weight of the pheromone.
    pub beta: f64,
    /// Factor every pheromone cell is multiplied by after each iteration.
    pub evaporation: f64,
}

impl Params {
    /// Creates a new `Params` instance.
    ///
    /// # Returns
    /// The parameters, or `ColonyErr::InvalidParam` if `alpha` or `beta` are
    /// negative or `evaporation` is outside `(0, 1]`.
    pub fn new(alpha: f64, beta: f64, evaporation: f64) -> Result<Self> {
        let invalid = |name: &'static str, value: f64| ColonyErr::InvalidParam {
            name,
            value: value.to_string(),
        };

        if !(alpha >= 0.0 && alpha.is_finite()) {
            return Err(invalid("alpha", alpha));
        }

        if !(beta >= 0.0 && beta.is_finite()) {
            return Err(invalid("beta", beta));
        }

        if !(evaporation > 0.0 && evaporation <= 1.0) {
            return Err(invalid("evaporation coefficient", evaporation));
        }

        Ok(Self {
            alpha,
            beta,
            evaporation,
        })
    }
}

/// The local state of one worker: its ants, its pheromones and its best tour.
#[derive(Debug, Clone)]
pub struct Colony {
    ants: usize,
    params: Params,
    pheromones: PheromoneMatrix,
    best: Option<Best>,
    // Best cost this worker has ever reached, merges don't overwrite it.
    record: Option<u64>,
    stagnation: u64,
}

impl Colony {
    /// Creates a new `Colony` with uniform pheromones and no best tour.
    ///
    /// # Arguments
    /// * `cities` - The amount of cities of the instance.
    /// * `ants` - The amount of ants this worker runs per iteration.
    /// * `params` - The run parameters.
    pub fn new(cities: usize, ants: usize, params: Params) -> Self {
        Self {
            ants,
            params,
            pheromones: PheromoneMatrix::new(cities),
            best: None,
            record: None,
            stagnation: 0,
        }
    }

    pub fn ants(&self) -> usize {
        self.ants
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn pheromones(&self) -> &PheromoneMatrix {
        &self.pheromones
    }

    pub fn best(&self) -> Option<&Best> {
        self.best.as_ref()
    }

    pub fn best_cost(&self) -> Option<u64> {
        self.best.as_ref().map(|best| best.cost)
    }

    pub fn stagnation(&self) -> u64 {
        self.stagnation
    }

    /// Runs a single local iteration.
    ///
    /// Every ant builds a tour, the best one is kept if strictly cheaper than
    /// the current best, the stagnation counter is updated, the pheromones
    /// evaporate and then get reinforced along the best tour.
    ///
    /// # Errors
    /// Returns `ColonyErr::NoCandidate` if an ant can't choose a next city.
    pub fn iterate(&mut self, distances: &DistanceMatrix, stream: &mut RandomStream) -> Result<()> {
        for ant in 0..self.ants {
            let tour = construct(distances, &self.pheromones, &self.params, stream)?;
            let cost = tour.cost(distances);
            trace!(ant = ant, cost = cost; "ant finished");
            self.offer(tour, cost);
        }

        let best_cost = self.best_cost();
        if improves(best_cost, self.record) {
            self.record = best_cost;
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }

        self.pheromones.evaporate(self.params.evaporation);

        if let Some(best) = &self.best {
            self.pheromones.reinforce(&best.tour, best.cost);
        }

        Ok(())
    }

    /// Keeps `tour` as the best one if it's strictly cheaper.
    ///
    /// # Returns
    /// Whether the tour replaced the current best.
    pub fn offer(&mut self, tour: Tour, cost: u64) -> bool {
        let better = improves(Some(cost), self.best_cost());
        if better {
            self.best = Some(Best { tour, cost });
        }

        better
    }

    /// Snapshots what this worker shares during a synchronization round.
    pub fn contribution(&self, rank: usize) -> Contribution {
        let trail = self
            .best
            .as_ref()
            .map(|best| self.pheromones.trail(&best.tour))
            .unwrap_or_default();

        Contribution {
            rank,
            best: self.best.clone(),
            stagnation: self.stagnation,
            trail,
        }
    }

    pub(crate) fn adopt(&mut self, pheromones: PheromoneMatrix, best: Option<Best>, stagnation: u64) {
        self.pheromones = pheromones;
        self.best = best;
        self.stagnation = stagnation;
    }
}
