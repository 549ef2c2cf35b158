use std::borrow::Cow;

use colony::{Contribution, Tour};
use comms::msg::Msg;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{Collective, Link};
use crate::error::Result;

/// A member's end of the star, talks to the coordinator only.
pub struct Spoke<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    rank: usize,
    size: usize,
    cities: usize,
    hub: Link<R, W>,
}

impl<R, W> Spoke<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Spoke`.
    ///
    /// # Arguments
    /// * `rank` - This member's rank.
    /// * `size` - The amount of workers of the run.
    /// * `cities` - The amount of cities of the instance.
    /// * `hub` - The link to the coordinator.
    pub fn new(rank: usize, size: usize, cities: usize, hub: Link<R, W>) -> Self {
        Self {
            rank,
            size,
            cities,
            hub,
        }
    }
}

impl<R, W> Collective for Spoke<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn all_gather(&mut self, own: Contribution) -> Result<Vec<Contribution>> {
        self.hub.send_contribution(&own).await?;

        let mut all = Vec::with_capacity(self.size);
        for rank in 0..self.size {
            all.push(self.hub.recv_contribution(rank, self.cities).await?);
        }

        Ok(all)
    }

    async fn gather_tours(&mut self, own: Option<&Tour>) -> Result<Option<Vec<Option<Tour>>>> {
        self.hub.send_tour(own).await?;
        Ok(None)
    }

    async fn abort(&mut self, detail: &str) -> Result<()> {
        let msg = Msg::Err(Cow::Borrowed(detail));
        self.hub.send(&msg).await
    }

    async fn close(&mut self) -> Result<()> {
        self.hub.recv_disconnect().await
    }
}
