use std::sync::Arc;

use crate::error::{ColonyErr, Result};

/// A finite sequence of integers consumed in circles through a cursor.
///
/// Clones share the values but each keeps its own cursor.
#[derive(Debug, Clone)]
pub struct RandomStream {
    values: Arc<[u64]>,
    cursor: usize,
}

impl RandomStream {
    /// Creates a new `RandomStream` positioned at its first value.
    ///
    /// # Returns
    /// The stream, or `ColonyErr::EmptyStream` if `values` is empty.
    pub fn new(values: Vec<u64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ColonyErr::EmptyStream);
        }

        Ok(Self {
            values: values.into(),
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Index of the value the next draw returns.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the value under the cursor and moves past it.
    pub fn draw(&mut self) -> u64 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }

    /// Skips `count` values.
    pub fn advance(&mut self, count: u128) {
        let len = self.values.len() as u128;
        self.cursor = ((self.cursor as u128 + count % len) % len) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_wrap_around() {
        let mut stream = RandomStream::new(vec![5, 6, 7]).unwrap();
        let drawn: Vec<_> = (0..7).map(|_| stream.draw()).collect();
        assert_eq!(drawn, vec![5, 6, 7, 5, 6, 7, 5]);
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn advance_is_modular() {
        let mut stream = RandomStream::new(vec![1, 2, 3, 4]).unwrap();
        stream.advance(4 * 1_000_000_007 + 3);
        assert_eq!(stream.position(), 3);
        assert_eq!(stream.draw(), 4);
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(RandomStream::new(vec![]).unwrap_err(), ColonyErr::EmptyStream);
    }
}
