use arena::Arena;
use birdwatcher::{BirdData, Birdwatcher};
use controller::AgentSeed;
use error::SimError;
use options::RunOptions;

pub mod arena;
pub mod bird;
pub mod controller;
pub mod ground;
pub mod mask;
pub mod pipe;

pub mod birdwatcher;
pub mod error;
pub mod options;

/// Outcome of one generation run. The per-agent fitness lives in the cells
/// the caller handed in through the seeds, not here.
pub struct RunSummary {
    pub score: u32,
    pub ticks: u64,
    pub data: Vec<BirdData>,
}

/// Runs one generation until every agent has been culled, or for at most
/// `no_iter` ticks, sampling run data along the way.
pub fn arena_base(
    seeds: Vec<AgentSeed>,
    no_iter: u64,
    run_options: &RunOptions,
) -> Result<RunSummary, SimError> {
    run_options.validate()?;

    let mut arena = Arena::new(seeds, run_options);
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);

    for _ in 0..no_iter {
        if !arena.is_running() {
            break;
        }
        arena.update(run_options);
        bird_watcher.watch(&arena);
    }

    let data = bird_watcher.pop_data_save(&run_options.save_options)?;

    Ok(RunSummary {
        score: arena.score(),
        ticks: arena.ticks(),
        data,
    })
}
