//! Collective operations every worker takes part in, in lockstep.

mod hub;
pub(crate) mod link;
mod spoke;

pub use hub::Hub;
pub use link::Link;
pub use spoke::Spoke;

use colony::{Contribution, Tour};

use crate::error::Result;

/// The communication steps of a run, all of them block until every worker
/// reached them.
#[allow(unused)]
#[trait_variant::make(Collective: Send)]
pub trait CollectiveTemplate {
    /// This worker's rank, the coordinator is rank `0`.
    fn rank(&self) -> usize;

    /// The amount of workers of the run.
    fn size(&self) -> usize;

    /// Shares `own` with every worker.
    ///
    /// # Returns
    /// The contributions of every worker, this one's included, in rank order.
    async fn all_gather(&mut self, own: Contribution) -> Result<Vec<Contribution>>;

    /// Sends this worker's final tour to the coordinator.
    ///
    /// # Returns
    /// The tours of every other worker in rank order on the coordinator,
    /// `None` anywhere else.
    async fn gather_tours(&mut self, own: Option<&Tour>) -> Result<Option<Vec<Option<Tour>>>>;

    /// Tells every peer this worker failed with `detail`.
    async fn abort(&mut self, detail: &str) -> Result<()>;

    /// Ends the run, the coordinator releases every member.
    async fn close(&mut self) -> Result<()>;
}
