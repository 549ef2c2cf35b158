use std::borrow::Cow;

use colony::{Contribution, Tour};
use comms::msg::{Command, Msg};
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{Collective, Link};
use crate::error::{NodeErr, Result};

/// The coordinator's end of the star, rank `0`.
///
/// Holds a link to every member and relays their contributions. Without
/// members it runs a single worker.
pub struct Hub<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    cities: usize,
    members: Vec<Link<R, W>>,
}

impl<R, W> Hub<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Hub`.
    ///
    /// # Arguments
    /// * `cities` - The amount of cities of the instance.
    /// * `members` - A link to each member, ordered by rank starting at `1`.
    ///
    /// # Errors
    /// Returns `NodeErr::RankMismatch` if the links aren't ordered by rank.
    pub fn new(cities: usize, members: Vec<Link<R, W>>) -> Result<Self> {
        for (i, member) in members.iter().enumerate() {
            if member.peer() != i + 1 {
                return Err(NodeErr::RankMismatch {
                    expected: i + 1,
                    got: member.peer(),
                });
            }
        }

        Ok(Self { cities, members })
    }
}

impl<R, W> Collective for Hub<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        self.members.len() + 1
    }

    async fn all_gather(&mut self, own: Contribution) -> Result<Vec<Contribution>> {
        let mut all = Vec::with_capacity(self.size());
        all.push(own);

        for member in &mut self.members {
            let contribution = member.recv_contribution(member.peer(), self.cities).await?;
            all.push(contribution);
        }

        for member in &mut self.members {
            for contribution in &all {
                member.send_contribution(contribution).await?;
            }
        }

        debug!(workers = all.len(); "contributions relayed");
        Ok(all)
    }

    async fn gather_tours(&mut self, _own: Option<&Tour>) -> Result<Option<Vec<Option<Tour>>>> {
        let mut tours = Vec::with_capacity(self.members.len());

        for member in &mut self.members {
            tours.push(member.recv_tour(self.cities).await?);
        }

        Ok(Some(tours))
    }

    async fn abort(&mut self, detail: &str) -> Result<()> {
        let msg = Msg::Err(Cow::Borrowed(detail));
        let mut result = Ok(());

        // Members that are already gone must not keep the rest uninformed.
        for member in &mut self.members {
            if let Err(e) = member.send(&msg).await {
                result = Err(e);
            }
        }

        result
    }

    async fn close(&mut self) -> Result<()> {
        let msg = Msg::Control(Command::Disconnect);

        for member in &mut self.members {
            member.send(&msg).await?;
            member.shutdown().await?;
        }

        Ok(())
    }
}
