use ndarray::{Array2, Zip};

use crate::{error::LoadErr, tour::Tour};

/// Value every pheromone cell starts with.
pub const INITIAL_PHEROMONE: f64 = 0.1;

/// Reinforcement never leaves a cell above this value.
pub const MAX_PHEROMONE: f64 = 1.0;

/// Immutable square matrix of inter-city costs, identical on every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    cells: Array2<u32>,
}

impl DistanceMatrix {
    /// Creates a new `DistanceMatrix` from its row-major values.
    ///
    /// # Arguments
    /// * `cities` - The side of the matrix.
    /// * `values` - Exactly `cities * cities` distances.
    ///
    /// # Returns
    /// The matrix, or a `LoadErr` if the shape is wrong or two distinct
    /// cities are at distance zero.
    pub fn from_flat(cities: usize, values: Vec<u32>) -> Result<Self, LoadErr> {
        if cities == 0 {
            return Err(LoadErr::Empty { what: "city count" });
        }

        let got = values.len();
        let cells = Array2::from_shape_vec((cities, cities), values).map_err(|_| {
            LoadErr::Invalid {
                what: format!("distance count for {cities} cities"),
                token: got.to_string(),
            }
        })?;

        if let Some(((row, col), _)) = cells
            .indexed_iter()
            .find(|&((row, col), &d)| row != col && d == 0)
        {
            return Err(LoadErr::ZeroDistance { row, col });
        }

        Ok(Self { cells })
    }

    /// Returns the amount of cities.
    pub fn cities(&self) -> usize {
        self.cells.nrows()
    }

    /// Returns the distance from city `i` to city `j`.
    ///
    /// # Panics
    /// If either index is out of bounds.
    pub fn distance(&self, i: usize, j: usize) -> u32 {
        self.cells[[i, j]]
    }

    /// Returns the distance from city `i` to city `j`, or `None` if out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        self.cells.get((i, j)).copied()
    }

    /// Returns a row-major copy of every distance, for propagation.
    pub fn to_flat(&self) -> Vec<u32> {
        self.cells.iter().copied().collect()
    }
}

/// Mutable square matrix of desirability scores, owned by a single worker.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    cells: Array2<f64>,
}

impl PheromoneMatrix {
    /// Creates a new `PheromoneMatrix` with every cell at `INITIAL_PHEROMONE`.
    pub fn new(cities: usize) -> Self {
        Self::uniform(cities, INITIAL_PHEROMONE)
    }

    /// Creates a new `PheromoneMatrix` with every cell at `value`.
    pub fn uniform(cities: usize, value: f64) -> Self {
        Self {
            cells: Array2::from_elem((cities, cities), value),
        }
    }

    pub fn cities(&self) -> usize {
        self.cells.nrows()
    }

    /// Returns the pheromone on the edge from `i` to `j`.
    ///
    /// # Panics
    /// If either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[[i, j]]
    }

    /// Iterates over every cell in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().copied()
    }

    /// Multiplies every cell by `coeff`.
    pub fn evaporate(&mut self, coeff: f64) {
        self.cells.mapv_inplace(|p| p * coeff);
    }

    /// Deposits `1 / cost` on both directions of every edge of `tour`.
    ///
    /// Whenever the forward cell goes over `MAX_PHEROMONE` both directions
    /// are set to it.
    pub fn reinforce(&mut self, tour: &Tour, cost: u64) {
        let deposit = 1.0 / cost as f64;

        for (a, b) in tour.edges() {
            self.cells[[a, b]] += deposit;
            self.cells[[b, a]] += deposit;

            if self.cells[[a, b]] > MAX_PHEROMONE {
                self.cells[[a, b]] = MAX_PHEROMONE;
                self.cells[[b, a]] = MAX_PHEROMONE;
            }
        }
    }

    /// Returns the pheromone on each edge of `tour`, in tour order with the
    /// closing edge last.
    pub fn trail(&self, tour: &Tour) -> Vec<f64> {
        tour.edges().map(|(a, b)| self.cells[[a, b]]).collect()
    }

    pub(crate) fn accumulate(&mut self, i: usize, j: usize, value: f64) {
        self.cells[[i, j]] += value;
    }

    /// Divides every cell by its contribution count.
    pub(crate) fn average(&mut self, counts: &Array2<u32>) {
        Zip::from(&mut self.cells)
            .and(counts)
            .for_each(|p, &count| *p /= f64::from(count));
    }
}
