use crate::{
    error::{ColonyErr, Result},
    matrix::DistanceMatrix,
};

/// A Hamiltonian cycle over every city, the last city connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    cities: Vec<usize>,
}

impl Tour {
    /// Creates a new `Tour` from the order its cities are visited in.
    ///
    /// # Arguments
    /// * `cities` - The city sequence.
    /// * `n` - The amount of cities of the instance.
    ///
    /// # Returns
    /// The tour, or `ColonyErr::InvalidTour` if `cities` isn't a permutation of `0..n`.
    pub fn from_cities(cities: Vec<usize>, n: usize) -> Result<Self> {
        let invalid = |detail: String| ColonyErr::InvalidTour { cities: n, detail };

        if cities.len() != n {
            return Err(invalid(format!("has {} cities", cities.len())));
        }

        let mut seen = vec![false; n];
        for &city in &cities {
            match seen.get_mut(city) {
                None => return Err(invalid(format!("city {city} is out of range"))),
                Some(true) => return Err(invalid(format!("city {city} is visited twice"))),
                Some(slot) => *slot = true,
            }
        }

        Ok(Self { cities })
    }

    /// Wraps a sequence the constructor already knows to be a permutation.
    pub(crate) fn from_sequence(cities: Vec<usize>) -> Self {
        Self { cities }
    }

    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Returns the position each city is visited at, indexed by city.
    pub fn visit_order(&self) -> Vec<usize> {
        let mut order = vec![0; self.cities.len()];
        for (position, &city) in self.cities.iter().enumerate() {
            order[city] = position;
        }

        order
    }

    /// Iterates over the edges of the cycle, the closing edge comes last.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let next = self.cities.iter().cycle().skip(1);
        self.cities.iter().copied().zip(next.copied())
    }

    /// Sums the distance of every edge of the cycle, wrap-around included.
    pub fn cost(&self, distances: &DistanceMatrix) -> u64 {
        self.edges()
            .map(|(a, b)| u64::from(distances.distance(a, b)))
            .sum()
    }
}

/// A tour paired with its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Best {
    pub tour: Tour,
    pub cost: u64,
}

impl Best {
    /// Creates a new `Best` computing the cost of `tour`.
    pub fn priced(tour: Tour, distances: &DistanceMatrix) -> Self {
        let cost = tour.cost(distances);
        Self { tour, cost }
    }
}

/// Orders optional costs so that any cost beats a missing one.
pub(crate) fn cost_key(cost: Option<u64>) -> (bool, u64) {
    (cost.is_none(), cost.unwrap_or_default())
}

/// Whether `candidate` is strictly better than `incumbent`.
pub(crate) fn improves(candidate: Option<u64>, incumbent: Option<u64>) -> bool {
    cost_key(candidate) < cost_key(incumbent)
}
