//! Probabilistic tour construction, one ant at a time.

use log::{debug, trace};

use crate::{
    colony::Params,
    error::{ColonyErr, Result},
    matrix::{DistanceMatrix, PheromoneMatrix},
    stream::RandomStream,
    tour::Tour,
};

/// Granularity of the roulette, probabilities are scaled to integer percents.
const ROULETTE_SLOTS: u64 = 100;

/// Computes the probability of moving from `current` to every city.
///
/// Visited cities and `current` itself get `0`. The rest are weighted by
/// `(1 / distance)^alpha * pheromone^beta`; if every weight is `0` they
/// are weighted `1` instead so the outcome stays reproducible.
///
/// # Arguments
/// * `current` - The city the ant stands on.
/// * `positions` - Position each city was visited at, `None` if unvisited.
pub fn probabilities(
    current: usize,
    positions: &[Option<usize>],
    distances: &DistanceMatrix,
    pheromones: &PheromoneMatrix,
    params: &Params,
) -> Vec<f64> {
    let open = |city: usize| positions[city].is_none() && city != current;

    let mut weights: Vec<f64> = (0..positions.len())
        .map(|city| {
            if !open(city) {
                return 0.0;
            }

            let visibility = 1.0 / f64::from(distances.distance(current, city));
            visibility.powf(params.alpha) * pheromones.get(current, city).powf(params.beta)
        })
        .collect();

    let mut total: f64 = weights.iter().sum();

    if total == 0.0 {
        debug!(current = current; "every weight vanished, falling back to a uniform choice");

        for (city, weight) in weights.iter_mut().enumerate() {
            if open(city) {
                *weight = 1.0;
                total += 1.0;
            }
        }
    }

    weights.iter_mut().for_each(|w| *w /= total);
    weights
}

/// Selects the next city for an ant standing on `current`.
///
/// Every probability is scaled to percents, narrowed to `f32` and rounded up,
/// then accumulated in city order. The first city whose running sum reaches
/// `random % 100 + 1` wins.
///
/// # Returns
/// The chosen unvisited city, or `ColonyErr::NoCandidate` if the scan ran out
/// of cities, which means the probabilities were broken.
pub fn next_city(
    current: usize,
    positions: &[Option<usize>],
    distances: &DistanceMatrix,
    pheromones: &PheromoneMatrix,
    params: &Params,
    random: u64,
) -> Result<usize> {
    let probabilities = probabilities(current, positions, distances, pheromones, params);
    let target = random % ROULETTE_SLOTS + 1;

    let mut sum = 0;
    for (city, p) in probabilities.into_iter().enumerate() {
        sum += ((p * ROULETTE_SLOTS as f64) as f32).ceil() as u64;
        if sum >= target {
            return Ok(city);
        }
    }

    Err(ColonyErr::NoCandidate { current, target })
}

/// Builds a complete tour, drawing exactly one stream value per city.
///
/// The first draw picks the start city, each following one picks a step.
pub fn construct(
    distances: &DistanceMatrix,
    pheromones: &PheromoneMatrix,
    params: &Params,
    stream: &mut RandomStream,
) -> Result<Tour> {
    let n = distances.cities();
    let mut positions = vec![None; n];
    let mut cities = Vec::with_capacity(n);

    let mut current = (stream.draw() % n as u64) as usize;
    positions[current] = Some(0);
    cities.push(current);

    for step in 1..n {
        let random = stream.draw();
        current = next_city(current, &positions, distances, pheromones, params, random)?;
        positions[current] = Some(step);
        cities.push(current);
    }

    trace!(start = cities[0], cursor = stream.position(); "tour constructed");
    Ok(Tour::from_sequence(cities))
}
