use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[derive(ClapSerde)]
#[command(version, about, long_about = None)]
/// Headless neuroevolution trainer for the flappers evaluation core.
pub struct Args {
    /// Config file
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the
/// `-c` or `--config` arg option
pub struct Config {
    #[default(100)]
    #[arg(short = 'n', long)]
    /// number of birds per generation
    pub no_agents: usize,

    #[default(50)]
    #[arg(short = 'g', long)]
    /// generations to train for
    pub generations: usize,

    #[default(10000)]
    #[arg(long)]
    /// tick cap per generation, guards against a perfect flier never dying
    pub max_ticks: u64,

    #[default(1)]
    #[arg(short = 'r', long)]
    /// ratio of ticks/sample_rate, e.g. 4 = sample every 4th tick
    pub sample_rate: u64,

    #[default(false)]
    #[arg(short = 's', long)]
    pub save: bool,

    #[default(false)]
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    #[default(0)]
    #[arg(long)]
    /// obstacle stream seed, 0 draws one from entropy
    pub seed: u64,

    #[default(2)]
    #[arg(long)]
    /// top genomes copied unchanged into the next generation
    pub elite_count: usize,

    #[default(0.15)]
    #[arg(long = "mut_rate")]
    /// per-weight mutation probability
    pub mutation_rate: f32,

    #[default(0.5)]
    #[arg(long = "mut_strength")]
    /// half-width of the uniform mutation nudge
    pub mutation_strength: f32,
}
