use std::error::Error;
use std::{fs::File, io::BufReader};

use clap_serde_derive::{clap::Parser, ClapSerde};
use log::{error, info};

use flappers_lib::arena_base;
use flappers_lib::options::{RunOptions, SaveOptions};

mod cliargs;
mod trainer;

use cliargs::{Args, Config};
use trainer::Trainer;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();

    // Get config file
    let config = if let Ok(f) = File::open(&args.config_path) {
        // Parse config with serde
        match serde_yaml::from_reader::<_, <Config as ClapSerde>::Opt>(BufReader::new(f)) {
            // merge config already parsed from clap
            Ok(config) => Config::from(config).merge(&mut args.config),
            Err(err) => return Err(format!("error in configuration file: {err}").into()),
        }
    } else {
        // If there is no config file return only config parsed from clap
        Config::from(&mut args.config)
    };

    if config.no_agents == 0 {
        return Err("at least one agent per generation is required".into());
    }

    let mut run_options: RunOptions = Default::default();

    run_options.sample_rate = config.sample_rate;
    run_options.rng_seed = (config.seed != 0).then_some(config.seed);

    let save_options = SaveOptions {
        save_locations: config.save,
        save_locations_timestamp: config.save_timestamp,

        // default
        save_locations_path: run_options.save_options.save_locations_path.clone(),
    };
    run_options.save_options = save_options;

    run_options.validate()?;

    let mut trainer = Trainer::new(&config);

    for generation in 0..config.generations {
        let summary = arena_base(trainer.seeds(), config.max_ticks, &run_options)?;
        let report = trainer.evolve();

        info!(
            "generation {generation:>3}: score {:>4}, {:>6} ticks, best fitness {:>8.1}, mean {:>8.1}",
            summary.score, summary.ticks, report.best, report.mean
        );
    }

    Ok(())
}
