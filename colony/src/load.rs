//! Readers for the distance and random number text files.
//!
//! Both formats are a count followed by whitespace separated integers,
//! anything after the last expected token is ignored.

use std::{fs, path::Path, str::FromStr};

use crate::{error::LoadErr, matrix::DistanceMatrix};

/// Reads the distance matrix stored at `path`.
pub fn load_distances<P: AsRef<Path>>(path: P) -> Result<DistanceMatrix, LoadErr> {
    parse_distances(&fs::read_to_string(path)?)
}

/// Parses a city count `n` followed by the `n * n` distances in row-major order.
pub fn parse_distances(text: &str) -> Result<DistanceMatrix, LoadErr> {
    let mut tokens = text.split_whitespace();

    let cities: usize = next(&mut tokens, || "city count".to_string())?;
    if cities == 0 {
        return Err(LoadErr::Empty { what: "city count" });
    }

    if cities.checked_mul(cities).is_none() {
        return Err(LoadErr::Invalid {
            what: "city count".to_string(),
            token: cities.to_string(),
        });
    }

    let mut values = Vec::new();
    for row in 0..cities {
        for col in 0..cities {
            values.push(next(&mut tokens, || format!("distance ({row}, {col})"))?);
        }
    }

    DistanceMatrix::from_flat(cities, values)
}

/// Reads the random number stream stored at `path`.
pub fn load_randoms<P: AsRef<Path>>(path: P) -> Result<Vec<u64>, LoadErr> {
    parse_randoms(&fs::read_to_string(path)?)
}

/// Parses a stream length followed by that many random numbers.
///
/// The numbers must be non-negative, a negative one is `LoadErr::Invalid`.
pub fn parse_randoms(text: &str) -> Result<Vec<u64>, LoadErr> {
    let mut tokens = text.split_whitespace();

    let len: usize = next(&mut tokens, || "random stream length".to_string())?;
    if len == 0 {
        return Err(LoadErr::Empty {
            what: "random stream length",
        });
    }

    (0..len)
        .map(|i| next(&mut tokens, || format!("random number {i}")))
        .collect()
}

fn next<'a, T, I, F>(tokens: &mut I, what: F) -> Result<T, LoadErr>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
    F: FnOnce() -> String,
{
    let Some(token) = tokens.next() else {
        return Err(LoadErr::Missing { what: what() });
    };

    token.parse().map_err(|_| LoadErr::Invalid {
        what: what(),
        token: token.to_string(),
    })
}
