//! Ant Colony Optimization kernel for the symmetric traveling salesman problem.
//!
//! Everything a single worker needs: the distance and pheromone matrices, the
//! shared random stream, tour construction, the local optimization loop and
//! the pure parts of the synchronization protocol. Nothing here does I/O
//! apart from the file loaders.

mod colony;
mod consensus;
mod construct;
mod error;
mod load;
mod matrix;
mod reduce;
mod schedule;
mod stream;
mod termination;
mod tour;

pub use colony::{Colony, Params};
pub use consensus::{Consensus, Contribution};
pub use construct::{construct, next_city, probabilities};
pub use error::{ColonyErr, LoadErr, Result};
pub use load::{load_distances, load_randoms, parse_distances, parse_randoms};
pub use matrix::{DistanceMatrix, INITIAL_PHEROMONE, MAX_PHEROMONE, PheromoneMatrix};
pub use reduce::reduce;
pub use schedule::{Schedule, partition};
pub use stream::RandomStream;
pub use termination::StagnationBudget;
pub use tour::{Best, Tour};
