use colony::{ColonyErr, Params, Schedule, partition};
use comms::specs::{ParamsSpec, RunSpec};

use crate::error::{NodeErr, Result};

/// Everything every worker must agree on before the first round.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub schedule: Schedule,
    pub params: Params,
}

impl RunPlan {
    /// Creates a new `RunPlan`, splitting `ants` among `workers`.
    ///
    /// # Arguments
    /// * `workers` - The amount of workers of the run.
    /// * `ants` - The amount of ants across every worker.
    /// * `cities` - The amount of cities of the instance.
    /// * `external` - The amount of synchronization rounds.
    /// * `on_node` - The amount of local iterations per round.
    /// * `params` - The colony parameters.
    ///
    /// # Errors
    /// Returns `ColonyErr::InvalidParam` if any count is zero.
    pub fn new(
        workers: usize,
        ants: usize,
        cities: usize,
        external: u64,
        on_node: u64,
        params: Params,
    ) -> Result<Self> {
        positive("workers", workers as u64)?;
        positive("ants", ants as u64)?;
        positive("cities", cities as u64)?;
        positive("external iterations", external)?;
        positive("on node iterations", on_node)?;

        let schedule = Schedule::new(partition(ants, workers), cities, external, on_node);
        Ok(Self { schedule, params })
    }

    /// Rebuilds the plan a coordinator sent during bootstrap.
    ///
    /// # Errors
    /// Returns `NodeErr::InvalidSetup` if the description is inconsistent, or a
    /// colony error if a parameter is out of its domain.
    pub fn from_spec(spec: &RunSpec) -> Result<Self> {
        let RunSpec {
            rank,
            workers,
            cities,
            ants,
            params,
            ..
        } = spec;

        if ants.len() != *workers {
            return Err(NodeErr::InvalidSetup(format!(
                "{} ant shares for {workers} workers",
                ants.len()
            )));
        }

        if rank >= workers {
            return Err(NodeErr::InvalidSetup(format!(
                "rank {rank} out of {workers} workers"
            )));
        }

        let total: usize = ants.iter().sum();
        positive("ants", total as u64)?;
        positive("cities", *cities as u64)?;
        positive("external iterations", params.external_iterations)?;
        positive("on node iterations", params.on_node_iterations)?;

        Ok(Self {
            schedule: Schedule::new(
                ants.clone(),
                *cities,
                params.external_iterations,
                params.on_node_iterations,
            ),
            params: Params::new(params.alpha, params.beta, params.evaporation)?,
        })
    }

    /// Describes this plan for the worker at `rank`.
    pub fn to_spec(&self, rank: usize, randoms: usize) -> RunSpec {
        let schedule = &self.schedule;

        RunSpec {
            rank,
            workers: schedule.workers(),
            cities: schedule.cities(),
            randoms,
            ants: schedule.ants().to_vec(),
            params: ParamsSpec {
                external_iterations: schedule.external(),
                on_node_iterations: schedule.on_node(),
                alpha: self.params.alpha,
                beta: self.params.beta,
                evaporation: self.params.evaporation,
            },
        }
    }
}

fn positive(name: &'static str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(ColonyErr::InvalidParam {
            name,
            value: value.to_string(),
        }
        .into());
    }

    Ok(())
}
