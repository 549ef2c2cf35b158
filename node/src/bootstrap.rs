//! The handshake that turns a bare connection into a worker of the run.
//!
//! A member sends `Join`, the coordinator answers with `Setup`, the distance
//! matrix and the random stream, in that order.

use colony::{DistanceMatrix, RandomStream};
use comms::{
    MsgReceiver, MsgSender,
    msg::{Command, Msg, Payload},
};
use log::info;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{
        TcpListener, TcpStream, ToSocketAddrs,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

use crate::{
    collective::{Hub, Link, Spoke, link::unexpected},
    error::{NodeErr, Result},
    plan::RunPlan,
};

/// What a worker receives before its first round.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub rank: usize,
    pub plan: RunPlan,
    pub distances: DistanceMatrix,
    pub stream: RandomStream,
}

/// Coordinator side of the handshake with the member at `rank`.
///
/// # Returns
/// The link to the enrolled member.
pub async fn enroll<R, W>(
    rank: usize,
    rx: MsgReceiver<R>,
    tx: MsgSender<W>,
    plan: &RunPlan,
    distances: &DistanceMatrix,
    stream: &RandomStream,
) -> Result<Link<R, W>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut link = Link::new(rank, rx, tx);

    match link.recv().await? {
        Msg::Control(Command::Join) => {}
        msg => return Err(unexpected(rank, "join", &msg)),
    }

    let spec = plan.to_spec(rank, stream.len());
    link.send(&Msg::Control(Command::Setup(spec))).await?;

    let flat = distances.to_flat();
    link.send(&Msg::Data(Payload::Distances(&flat))).await?;
    link.send(&Msg::Data(Payload::Randoms(stream.values())))
        .await?;

    info!(rank = rank; "member enrolled");
    Ok(link)
}

/// Member side of the handshake.
///
/// # Errors
/// Returns an error if the coordinator's messages are out of order or don't
/// describe a consistent run.
pub async fn join<R, W>(rx: MsgReceiver<R>, tx: MsgSender<W>) -> Result<(Enrollment, Spoke<R, W>)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut link = Link::new(0, rx, tx);
    link.send(&Msg::Control(Command::Join)).await?;

    let spec = match link.recv().await? {
        Msg::Control(Command::Setup(spec)) => spec,
        msg => return Err(unexpected(0, "setup", &msg)),
    };

    let plan = RunPlan::from_spec(&spec)?;
    if spec.rank == 0 {
        return Err(NodeErr::InvalidSetup("members can't take rank 0".to_string()));
    }

    let distances = match link.recv().await? {
        Msg::Data(Payload::Distances(values)) => {
            let expected = spec.cities * spec.cities;
            if values.len() != expected {
                return Err(NodeErr::PayloadLength {
                    what: "distances",
                    got: values.len(),
                    expected,
                });
            }

            DistanceMatrix::from_flat(spec.cities, values.to_vec())?
        }
        msg => return Err(unexpected(0, "distances", &msg)),
    };

    let stream = match link.recv().await? {
        Msg::Data(Payload::Randoms(values)) => {
            if values.len() != spec.randoms {
                return Err(NodeErr::PayloadLength {
                    what: "randoms",
                    got: values.len(),
                    expected: spec.randoms,
                });
            }

            RandomStream::new(values.to_vec())?
        }
        msg => return Err(unexpected(0, "randoms", &msg)),
    };

    info!(rank = spec.rank, workers = spec.workers; "joined the run");

    let spoke = Spoke::new(spec.rank, spec.workers, spec.cities, link);
    let enrollment = Enrollment {
        rank: spec.rank,
        plan,
        distances,
        stream,
    };

    Ok((enrollment, spoke))
}

/// Accepts and enrolls every member of the run on `addr`.
///
/// Members get their ranks in the order they connect. A single worker run
/// doesn't bind any socket.
pub async fn listen<A: ToSocketAddrs>(
    addr: A,
    plan: &RunPlan,
    distances: &DistanceMatrix,
    stream: &RandomStream,
) -> Result<Hub<OwnedReadHalf, OwnedWriteHalf>> {
    let workers = plan.schedule.workers();
    let mut members = Vec::with_capacity(workers - 1);

    if workers > 1 {
        let listener = TcpListener::bind(addr).await?;
        info!("listening at {}, waiting for {} members", listener.local_addr()?, workers - 1);

        for rank in 1..workers {
            let (socket, peer) = listener.accept().await?;
            info!(rank = rank; "member connected from {peer}");

            let (rx, tx) = socket.into_split();
            let (rx, tx) = comms::channel(rx, tx);
            members.push(enroll(rank, rx, tx, plan, distances, stream).await?);
        }
    }

    Hub::new(distances.cities(), members)
}

/// Connects to the coordinator at `addr` and joins its run.
pub async fn connect<A: ToSocketAddrs>(
    addr: A,
) -> Result<(Enrollment, Spoke<OwnedReadHalf, OwnedWriteHalf>)> {
    let socket = TcpStream::connect(addr).await?;
    info!("connected to {}", socket.peer_addr()?);

    let (rx, tx) = socket.into_split();
    let (rx, tx) = comms::channel(rx, tx);
    join(rx, tx).await
}
