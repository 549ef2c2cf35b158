use crate::{
    matrix::DistanceMatrix,
    tour::{Best, Tour, improves},
};

/// Folds `tours` into `best`, a tour replaces the running best only if it's
/// strictly cheaper.
///
/// Costs of incoming tours are recomputed from `distances`.
pub fn reduce<I>(best: Option<Best>, tours: I, distances: &DistanceMatrix) -> Option<Best>
where
    I: IntoIterator<Item = Tour>,
{
    tours.into_iter().fold(best, |best, tour| {
        let candidate = Best::priced(tour, distances);
        if improves(Some(candidate.cost), best.as_ref().map(|b| b.cost)) {
            Some(candidate)
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> DistanceMatrix {
        #[rustfmt::skip]
        let values = vec![
            0, 1, 4, 3,
            1, 0, 2, 5,
            4, 2, 0, 1,
            3, 5, 1, 0,
        ];
        DistanceMatrix::from_flat(4, values).unwrap()
    }

    fn tour(cities: &[usize]) -> Tour {
        Tour::from_cities(cities.to_vec(), 4).unwrap()
    }

    #[test]
    fn keeps_the_cheapest() {
        let d = square();
        let own = Best::priced(tour(&[0, 2, 1, 3]), &d);

        let best = reduce(Some(own), [tour(&[0, 1, 3, 2]), tour(&[0, 1, 2, 3])], &d).unwrap();

        assert_eq!(best.cost, 7);
        assert_eq!(best.tour, tour(&[0, 1, 2, 3]));
    }

    #[test]
    fn ties_keep_the_incumbent() {
        let d = square();
        let own = Best::priced(tour(&[0, 1, 2, 3]), &d);

        let best = reduce(Some(own.clone()), [tour(&[1, 2, 3, 0])], &d);

        assert_eq!(best, Some(own));
    }

    #[test]
    fn anything_beats_nothing() {
        let d = square();

        assert_eq!(reduce(None, Vec::new(), &d), None);
        assert_eq!(reduce(None, [tour(&[0, 2, 1, 3])], &d).unwrap().cost, 4 + 2 + 5 + 3);
    }
}
