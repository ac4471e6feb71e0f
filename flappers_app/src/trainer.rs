use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

use itertools::Itertools;
use rand::rngs::ThreadRng;
use rand::Rng;

use flappers_lib::controller::{AgentSeed, Controller, Features, FitnessCell};

use crate::cliargs::Config;

const TOURNAMENT_SIZE: usize = 3;

/// Single-layer perceptron over the four arena features, sigmoid squashed so
/// the output lands in (0, 1) around the arena's 0.5 jump threshold.
#[derive(Clone, Debug)]
pub struct Perceptron {
    weights: [f32; 4],
    bias: f32,
}

impl Perceptron {
    fn random(rng: &mut impl Rng) -> Self {
        let mut weights = [0.; 4];
        for w in weights.iter_mut() {
            *w = rng.gen_range(-1.0..1.0);
        }

        Perceptron {
            weights,
            bias: rng.gen_range(-1.0..1.0),
        }
    }

    fn mutated(&self, rate: f32, strength: f32, rng: &mut impl Rng) -> Self {
        let mut child = self.clone();

        for w in child
            .weights
            .iter_mut()
            .chain(std::iter::once(&mut child.bias))
        {
            if rng.gen::<f32>() < rate {
                *w += rng.gen_range(-strength..strength);
            }
        }

        child
    }
}

impl Controller for Perceptron {
    fn activate(&mut self, features: Features) -> f32 {
        let inputs = features.as_array();
        let sum: f32 = self
            .weights
            .iter()
            .zip(inputs.iter())
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias;

        1. / (1. + (-sum).exp())
    }
}

/// One genome and the fitness cell it shares with the arena.
struct Genome {
    net: Perceptron,
    fitness: FitnessCell,
}

pub struct GenerationReport {
    pub best: f32,
    pub mean: f32,
}

/// Minimal population optimizer standing in for a full neuroevolution
/// framework: elitism plus tournament selection plus weight mutation. The
/// arena never learns any of this exists.
pub struct Trainer {
    population: Vec<Genome>,
    elite_count: usize,
    mutation_rate: f32,
    mutation_strength: f32,
    rng: ThreadRng,
}

impl Trainer {
    pub fn new(config: &Config) -> Self {
        let mut rng = rand::thread_rng();

        let population = (0..config.no_agents)
            .map(|_| Genome {
                net: Perceptron::random(&mut rng),
                fitness: Rc::new(Cell::new(0.)),
            })
            .collect();

        Trainer {
            population,
            elite_count: config.elite_count,
            mutation_rate: config.mutation_rate,
            mutation_strength: config.mutation_strength,
            rng,
        }
    }

    /// Seeds for one generation run; every fitness cell is reset to zero
    /// before the arena starts accumulating into it.
    pub fn seeds(&self) -> Vec<AgentSeed> {
        self.population
            .iter()
            .map(|genome| {
                genome.fitness.set(0.);
                AgentSeed {
                    controller: Box::new(genome.net.clone()),
                    fitness: Rc::clone(&genome.fitness),
                }
            })
            .collect()
    }

    /// Folds the finished generation's fitness into the next population and
    /// reports the generation's stats.
    pub fn evolve(&mut self) -> GenerationReport {
        let best = self
            .population
            .iter()
            .map(|g| g.fitness.get())
            .fold(f32::MIN, f32::max);
        let mean = self
            .population
            .iter()
            .map(|g| g.fitness.get())
            .sum::<f32>()
            / self.population.len().max(1) as f32;

        let mut next: Vec<Perceptron> = self
            .population
            .iter()
            .sorted_by(|a, b| {
                b.fitness
                    .get()
                    .partial_cmp(&a.fitness.get())
                    .unwrap_or(Ordering::Equal)
            })
            .take(self.elite_count)
            .map(|g| g.net.clone())
            .collect();

        while next.len() < self.population.len() {
            let parent = self.tournament();
            next.push(parent.mutated(self.mutation_rate, self.mutation_strength, &mut self.rng));
        }

        self.population = next
            .into_iter()
            .map(|net| Genome {
                net,
                fitness: Rc::new(Cell::new(0.)),
            })
            .collect();

        GenerationReport { best, mean }
    }

    fn tournament(&mut self) -> Perceptron {
        let mut best: Option<usize> = None;

        for _ in 0..TOURNAMENT_SIZE {
            let pick = self.rng.gen_range(0..self.population.len());
            let better = match best {
                Some(current) => {
                    self.population[pick].fitness.get() > self.population[current].fitness.get()
                }
                None => true,
            };
            if better {
                best = Some(pick);
            }
        }

        // TOURNAMENT_SIZE > 0, so a pick always exists
        self.population[best.unwrap_or(0)].net.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(no_agents: usize) -> Config {
        let mut config = Config::default();
        config.no_agents = no_agents;
        config.elite_count = 1;
        config
    }

    #[test]
    fn perceptron_output_stays_in_unit_interval() {
        let mut rng = rand::thread_rng();
        let mut net = Perceptron::random(&mut rng);

        let features = Features {
            y: 200.,
            dist_gap_top: 40.,
            dist_gap_bottom: 110.,
            pipe_x: 320.,
        };

        let out = net.activate(features);
        assert!(out.is_finite());
        assert!((0. ..=1.).contains(&out));
    }

    #[test]
    fn seeds_reset_fitness_cells() {
        let trainer = Trainer::new(&test_config(5));
        for genome in &trainer.population {
            genome.fitness.set(42.);
        }

        let seeds = trainer.seeds();

        assert_eq!(seeds.len(), 5);
        for seed in &seeds {
            assert_eq!(seed.fitness.get(), 0.);
        }
    }

    #[test]
    fn evolve_keeps_population_size_and_reports_best() {
        let mut trainer = Trainer::new(&test_config(8));
        for (i, genome) in trainer.population.iter().enumerate() {
            genome.fitness.set(i as f32);
        }

        let report = trainer.evolve();

        assert_eq!(trainer.population.len(), 8);
        assert_eq!(report.best, 7.);
        assert_eq!(report.mean, 3.5);
    }
}
