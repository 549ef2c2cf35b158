use colony::{Best, Colony, Consensus, DistanceMatrix, RandomStream, reduce};
use log::{debug, info, warn};

use crate::{
    bootstrap::Enrollment,
    collective::Collective,
    error::Result,
    plan::RunPlan,
};

/// The merged standing of every worker right after a synchronization round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    pub cost: Option<u64>,
    pub stagnation: u64,
}

/// What a worker is left with once its run is over.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rank: usize,
    pub history: Vec<RoundReport>,
    /// Whether the stagnation budget cut the outer loop short.
    pub stopped_early: bool,
    /// The global best on the coordinator, the local one anywhere else.
    pub best: Option<Best>,
}

/// A single process of the run, owning its colony and its stream cursor.
pub struct Worker {
    rank: usize,
    plan: RunPlan,
    distances: DistanceMatrix,
    stream: RandomStream,
    colony: Colony,
}

impl Worker {
    /// Creates a new `Worker`.
    ///
    /// The stream cursor starts past the values the lower ranks consume in a
    /// round.
    pub fn new(rank: usize, plan: RunPlan, distances: DistanceMatrix, mut stream: RandomStream) -> Self {
        stream.advance(plan.schedule.initial_offset(rank));
        let colony = Colony::new(distances.cities(), plan.schedule.ants_of(rank), plan.params);

        Self {
            rank,
            plan,
            distances,
            stream,
            colony,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    /// Runs the outer loop, then gathers the final tours on the coordinator.
    ///
    /// A failing worker reports the failure to its peers before returning it.
    ///
    /// # Errors
    /// Returns `NodeErr` on I/O failures, protocol violations or a broken
    /// tour construction.
    pub async fn run<C: Collective>(mut self, mut collective: C) -> Result<RunSummary> {
        match self.drive(&mut collective).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                if let Err(abort) = collective.abort(&e.to_string()).await {
                    warn!(rank = self.rank; "couldn't report the failure to the peers: {abort}");
                }

                Err(e)
            }
        }
    }

    async fn drive<C: Collective>(&mut self, collective: &mut C) -> Result<RunSummary> {
        let rank = self.rank;
        let schedule = &self.plan.schedule;
        let budget = schedule.budget();
        let skip = schedule.round_skip(rank);
        let (external, on_node) = (schedule.external(), schedule.on_node());

        let mut history = Vec::new();
        let mut stopped_early = false;

        for round in 0..external {
            if budget.exhausted(self.colony.stagnation()) {
                info!(
                    rank = rank,
                    round = round,
                    stagnation = self.colony.stagnation();
                    "stagnation budget exhausted"
                );
                stopped_early = true;
                break;
            }

            for _ in 0..on_node {
                self.colony.iterate(&self.distances, &mut self.stream)?;
            }

            let contributions = collective.all_gather(self.colony.contribution(rank)).await?;

            let mut consensus = Consensus::new(rank, &self.colony);
            for contribution in &contributions {
                consensus.absorb(contribution)?;
            }
            consensus.finish(&mut self.colony);

            self.stream.advance(skip);

            let report = RoundReport {
                round,
                cost: self.colony.best_cost(),
                stagnation: self.colony.stagnation(),
            };
            info!(
                rank = rank,
                round = round,
                cost:? = report.cost,
                stagnation = report.stagnation;
                "round finished"
            );
            history.push(report);
        }

        let own = self.colony.best().cloned();
        let tours = collective
            .gather_tours(own.as_ref().map(|best| &best.tour))
            .await?;

        let best = match tours {
            Some(tours) => reduce(own, tours.into_iter().flatten(), &self.distances),
            None => own,
        };

        collective.close().await?;
        debug!(rank = rank; "run closed");

        Ok(RunSummary {
            rank,
            history,
            stopped_early,
            best,
        })
    }
}

impl From<Enrollment> for Worker {
    fn from(value: Enrollment) -> Self {
        let Enrollment {
            rank,
            plan,
            distances,
            stream,
        } = value;

        Self::new(rank, plan, distances, stream)
    }
}
