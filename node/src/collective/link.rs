use colony::{Best, Contribution, Tour};
use comms::{
    MsgReceiver, MsgSender,
    msg::{Command, Msg, Payload},
};
use log::warn;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{NodeErr, Result};

/// One end of a point to point channel with the worker at rank `peer`.
pub struct Link<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    peer: usize,
    rx: MsgReceiver<R>,
    tx: MsgSender<W>,
    rx_buf: Vec<u64>,
}

impl<R, W> Link<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Link` to the worker at rank `peer`.
    pub fn new(peer: usize, rx: MsgReceiver<R>, tx: MsgSender<W>) -> Self {
        Self {
            peer,
            rx,
            tx,
            rx_buf: Vec::new(),
        }
    }

    pub fn peer(&self) -> usize {
        self.peer
    }

    pub async fn send<'a>(&mut self, msg: &'a Msg<'a>) -> Result<()> {
        self.tx.send(msg).await?;
        Ok(())
    }

    /// Ends the sending direction, the peer reads an end of stream next.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.tx.shutdown().await?;
        Ok(())
    }

    /// Waits for the next message, a peer's `Err` becomes `NodeErr::Peer`.
    pub async fn recv(&mut self) -> Result<Msg<'_>> {
        match self.rx.recv_into(&mut self.rx_buf).await? {
            Msg::Err(detail) => {
                warn!(peer = self.peer; "peer reported a failure: {detail}");
                Err(NodeErr::Peer {
                    rank: self.peer,
                    detail: detail.into_owned(),
                })
            }
            msg => Ok(msg),
        }
    }

    /// Waits for `Command::Disconnect`.
    pub async fn recv_disconnect(&mut self) -> Result<()> {
        let peer = self.peer;

        match self.recv().await? {
            Msg::Control(Command::Disconnect) => Ok(()),
            msg => Err(unexpected(peer, "disconnect", &msg)),
        }
    }

    /// Sends a contribution as its standing, its tour and its trail.
    pub async fn send_contribution(&mut self, contribution: &Contribution) -> Result<()> {
        let standing = Msg::Control(Command::Standing {
            rank: contribution.rank,
            cost: contribution.cost(),
            stagnation: contribution.stagnation,
        });
        self.send(&standing).await?;

        self.send_tour(contribution.best.as_ref().map(|best| &best.tour))
            .await?;

        let trail = Msg::Data(Payload::Trail(&contribution.trail));
        self.send(&trail).await
    }

    /// Receives the contribution of the worker at rank `rank`.
    ///
    /// # Errors
    /// Returns an error if the messages arrive out of order, come from
    /// another rank or don't fit an instance of `cities` cities.
    pub async fn recv_contribution(&mut self, rank: usize, cities: usize) -> Result<Contribution> {
        let peer = self.peer;

        let (got, cost, stagnation) = match self.recv().await? {
            Msg::Control(Command::Standing {
                rank: got,
                cost,
                stagnation,
            }) => (got, cost, stagnation),
            msg => return Err(unexpected(peer, "all-gather standing", &msg)),
        };

        if got != rank {
            return Err(NodeErr::RankMismatch {
                expected: rank,
                got,
            });
        }

        let sequence = self.recv_sequence("all-gather tour").await?;

        let trail = match self.recv().await? {
            Msg::Data(Payload::Trail(trail)) => trail.to_vec(),
            msg => return Err(unexpected(peer, "all-gather trail", &msg)),
        };

        let best = match cost {
            Some(cost) => Some(Best {
                tour: Tour::from_cities(sequence, cities)?,
                cost,
            }),
            None if sequence.is_empty() => None,
            None => {
                return Err(NodeErr::PayloadLength {
                    what: "tour",
                    got: sequence.len(),
                    expected: 0,
                });
            }
        };

        let expected = best.as_ref().map_or(0, |best| best.tour.len());
        if trail.len() != expected {
            return Err(NodeErr::PayloadLength {
                what: "trail",
                got: trail.len(),
                expected,
            });
        }

        Ok(Contribution {
            rank,
            best,
            stagnation,
            trail,
        })
    }

    /// Sends a tour as its city sequence, empty if there's none.
    pub async fn send_tour(&mut self, tour: Option<&Tour>) -> Result<()> {
        // Cities fit in `u32`, the distance matrix holds `cities²` of them.
        let sequence: Vec<u32> = tour
            .map(|tour| tour.cities().iter().map(|&city| city as u32).collect())
            .unwrap_or_default();

        let msg = Msg::Data(Payload::Tour(&sequence));
        self.send(&msg).await
    }

    /// Receives a tour sent with `send_tour`.
    pub async fn recv_tour(&mut self, cities: usize) -> Result<Option<Tour>> {
        let sequence = self.recv_sequence("final gather").await?;
        if sequence.is_empty() {
            return Ok(None);
        }

        Ok(Some(Tour::from_cities(sequence, cities)?))
    }

    async fn recv_sequence(&mut self, phase: &'static str) -> Result<Vec<usize>> {
        let peer = self.peer;

        match self.recv().await? {
            Msg::Data(Payload::Tour(sequence)) => {
                Ok(sequence.iter().map(|&city| city as usize).collect())
            }
            msg => Err(unexpected(peer, phase, &msg)),
        }
    }
}

pub(crate) fn unexpected(peer: usize, phase: &'static str, msg: &Msg<'_>) -> NodeErr {
    warn!(peer = peer, phase = phase, got = msg.kind(); "unexpected message");
    NodeErr::unexpected(phase, msg)
}
