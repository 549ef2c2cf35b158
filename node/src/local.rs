use std::io;

use colony::{DistanceMatrix, RandomStream};
use futures::future;
use tokio::io::duplex;

use crate::{
    bootstrap,
    collective::Hub,
    error::Result,
    plan::RunPlan,
    worker::{RunSummary, Worker},
};

const LOCAL_BUF_SIZE: usize = 64 * 1024;

/// Runs every worker of `plan` inside this process.
///
/// Members run as tasks and reach the coordinator through in-memory
/// channels, going through the same handshake as over the network.
///
/// # Returns
/// The summary of every worker, in rank order.
pub async fn launch_local(
    plan: RunPlan,
    distances: DistanceMatrix,
    stream: RandomStream,
) -> Result<Vec<RunSummary>> {
    let workers = plan.schedule.workers();
    let mut members = Vec::with_capacity(workers.saturating_sub(1));
    let mut tasks = Vec::with_capacity(workers.saturating_sub(1));

    for rank in 1..workers {
        let (near, far) = duplex(LOCAL_BUF_SIZE);

        let (rx, tx) = tokio::io::split(far);
        let (rx, tx) = comms::channel(rx, tx);
        tasks.push(tokio::spawn(async move {
            let (enrollment, spoke) = bootstrap::join(rx, tx).await?;
            Worker::from(enrollment).run(spoke).await
        }));

        let (rx, tx) = tokio::io::split(near);
        let (rx, tx) = comms::channel(rx, tx);
        members.push(bootstrap::enroll(rank, rx, tx, &plan, &distances, &stream).await?);
    }

    let hub = Hub::new(distances.cities(), members)?;
    let coordinator = Worker::new(0, plan, distances, stream).run(hub).await?;

    let mut summaries = Vec::with_capacity(workers);
    summaries.push(coordinator);

    for summary in future::try_join_all(tasks).await.map_err(io::Error::from)? {
        summaries.push(summary?);
    }

    Ok(summaries)
}
