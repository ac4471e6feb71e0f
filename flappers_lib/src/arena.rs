use log::debug;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::bird::Bird;
use crate::controller::{AgentSeed, Controller, Features, FitnessCell};
use crate::ground::Ground;
use crate::mask::{BIRD_HEIGHT, PIPE_WIDTH};
use crate::options::RunOptions;
use crate::pipe::Pipe;

/// One live agent. The record owns its decision function and fitness cell
/// alongside the kinematic state, so nothing can fall out of lockstep when
/// agents are removed.
pub struct Agent {
    /// stable identifier, assigned at generation start and never reused
    pub id: usize,
    pub bird: Bird,
    controller: Box<dyn Controller>,
    fitness: FitnessCell,
    alive: bool,
}

impl Agent {
    fn reward(&self, amount: f32) {
        self.fitness.set(self.fitness.get() + amount);
    }
}

/// Owns every collection for the duration of one generation run and is the
/// sole mutator: birds, pipes and the ground are advanced once per tick, in
/// lockstep, until the live set empties.
pub struct Arena {
    agents: Vec<Agent>,
    pipes: Vec<Pipe>,
    ground: Ground,
    score: u32,
    ticks: u64,
    rng: Xoshiro256PlusPlus,
}

impl Arena {
    pub fn new(seeds: Vec<AgentSeed>, run_options: &RunOptions) -> Self {
        let mut rng = match run_options.rng_seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let agents = seeds
            .into_iter()
            .enumerate()
            .map(|(id, seed)| Agent {
                id,
                bird: Bird::new(run_options.bird_x, run_options.bird_start_y),
                controller: seed.controller,
                fitness: seed.fitness,
                alive: true,
            })
            .collect();

        // the pipe list is seeded before the first tick and a pass always
        // spawns a successor, so feature queries never face an empty list
        let pipes = vec![Pipe::new(run_options.pipe_initial_x, &mut rng, run_options)];

        Arena {
            agents,
            pipes,
            ground: Ground::new(run_options),
            score: 0,
            ticks: 0,
            rng,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.agents.is_empty()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn live_count(&self) -> usize {
        self.agents.len()
    }

    /// Read-only snapshot of the live agents, for rendering and data capture.
    pub fn view(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    /// Index of the pipe the whole flock steers against this tick: the first
    /// pipe whose right edge the reference bird has not yet cleared.
    fn nearest_pipe_index(&self) -> usize {
        debug_assert!(!self.pipes.is_empty());

        let reference = &self.agents[0].bird;
        if self.pipes.len() > 1 && reference.position.x > self.pipes[0].x + PIPE_WIDTH as f32 {
            1
        } else {
            0
        }
    }

    /// Advances the whole simulation by one fixed tick. A call on a terminal
    /// arena (no live agents) is a no-op.
    pub fn update(&mut self, run_options: &RunOptions) {
        if self.agents.is_empty() {
            return;
        }

        // the live list only ever holds live agents between ticks
        debug_assert!(self.agents.iter().all(|a| a.alive));

        // decide and move: one shared target pipe for the whole tick
        let pipe_ind = self.nearest_pipe_index();
        let target = &self.pipes[pipe_ind];

        for agent in self.agents.iter_mut() {
            agent.reward(run_options.survival_reward);

            let features = Features::observe(&agent.bird, target);
            let output = agent.controller.activate(features);
            // non-finite or lazy outputs both read as "don't jump"
            if output.is_finite() && output > run_options.jump_threshold {
                agent.bird.jump(run_options);
            }

            agent.bird.integrate(run_options);
        }

        // collide, score, scroll
        let mut scored = false;
        for pipe in self.pipes.iter_mut() {
            for agent in self.agents.iter_mut().filter(|a| a.alive) {
                if pipe.collides(&agent.bird) {
                    agent.reward(-run_options.collision_penalty);
                    agent.alive = false;
                }
            }

            // batch-scored: once per pipe, however many birds crossed it
            if !pipe.passed
                && self
                    .agents
                    .iter()
                    .any(|a| a.alive && a.bird.position.x > pipe.x)
            {
                pipe.passed = true;
                scored = true;
                self.score += 1;
                debug!("pipe passed, score is now {}", self.score);

                for agent in self.agents.iter().filter(|a| a.alive) {
                    agent.reward(run_options.pass_bonus);
                }
            }

            pipe.advance(run_options);
        }

        if scored {
            self.pipes.push(Pipe::new(
                run_options.pipe_spawn_x,
                &mut self.rng,
                run_options,
            ));
        }
        self.pipes.retain(|pipe| !pipe.off_screen());

        // ground and ceiling are terminal but carry no penalty
        for agent in self.agents.iter_mut().filter(|a| a.alive) {
            let y = agent.bird.position.y;
            if y + BIRD_HEIGHT as f32 > run_options.window.ground_y || y < 0. {
                agent.alive = false;
            }
        }

        // compact once per tick; removals never happen mid-iteration
        self.agents.retain(|a| a.alive);
        if self.agents.is_empty() {
            debug!("live set empty after {} ticks, run is terminal", self.ticks + 1);
        }

        self.ground.advance(run_options);
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::Arena;
    use crate::controller::{AgentSeed, Controller, Features, FitnessCell};
    use crate::options::RunOptions;

    /// never jumps
    struct Still;
    impl Controller for Still {
        fn activate(&mut self, _: Features) -> f32 {
            0.
        }
    }

    /// jumps every tick
    struct Flapper;
    impl Controller for Flapper {
        fn activate(&mut self, _: Features) -> f32 {
            1.
        }
    }

    struct Broken;
    impl Controller for Broken {
        fn activate(&mut self, _: Features) -> f32 {
            f32::NAN
        }
    }

    fn seed_with(controller: Box<dyn Controller>) -> (AgentSeed, FitnessCell) {
        let fitness: FitnessCell = Rc::new(Cell::new(0.));
        (
            AgentSeed {
                controller,
                fitness: Rc::clone(&fitness),
            },
            fitness,
        )
    }

    /// options with the first pipe parked on top of the birds and a
    /// deterministic, near-degenerate gap band
    fn pipe_at_bird_options() -> RunOptions {
        let mut ro = RunOptions::default();
        ro.rng_seed = Some(7);
        ro.pipe_initial_x = ro.bird_x;
        ro.pipe_spawn_min = 199.;
        ro.pipe_spawn_max = 200.;
        ro
    }

    #[test]
    fn falling_bird_hits_the_ground_and_run_terminates() {
        let ro = RunOptions::default();
        let (seed, fitness) = seed_with(Box::new(Still));
        let mut arena = Arena::new(vec![seed], &ro);

        let mut guard = 0;
        while arena.is_running() && guard < 100 {
            arena.update(&ro);
            guard += 1;
        }

        assert!(!arena.is_running());
        assert_eq!(arena.live_count(), 0);
        // out-of-bounds carries no penalty: fitness is pure survival reward
        assert_relative_eq!(
            fitness.get(),
            arena.ticks() as f32 * ro.survival_reward,
            epsilon = 1e-4_f32
        );
    }

    #[test]
    fn collision_penalizes_and_culls_immediately() {
        let ro = pipe_at_bird_options();
        let (seed, fitness) = seed_with(Box::new(Flapper));
        let mut arena = Arena::new(vec![seed], &ro);

        arena.update(&ro);

        // the jump carries the bird into the top pipe on the very first tick
        assert_eq!(arena.live_count(), 0);
        assert!(!arena.is_running());
        assert_relative_eq!(
            fitness.get(),
            ro.survival_reward - ro.collision_penalty,
            epsilon = 1e-5_f32
        );
    }

    #[test]
    fn only_the_colliding_agent_is_removed() {
        let ro = pipe_at_bird_options();
        let (seed_a, fitness_a) = seed_with(Box::new(Flapper));
        let (seed_b, fitness_b) = seed_with(Box::new(Still));
        let mut arena = Arena::new(vec![seed_a, seed_b], &ro);

        arena.update(&ro);

        assert_eq!(arena.live_count(), 1);
        let survivor: Vec<usize> = arena.view().map(|a| a.id).collect();
        assert_eq!(survivor, vec![1]);

        assert_relative_eq!(
            fitness_a.get(),
            ro.survival_reward - ro.collision_penalty,
            epsilon = 1e-5_f32
        );
        assert_relative_eq!(fitness_b.get(), ro.survival_reward, epsilon = 1e-5_f32);
    }

    #[test]
    fn passing_a_pipe_scores_once_for_any_number_of_birds() {
        let mut ro = pipe_at_bird_options();
        ro.pipe_initial_x = 160.;

        let (seed_a, fitness_a) = seed_with(Box::new(Still));
        let (seed_b, fitness_b) = seed_with(Box::new(Still));
        let mut arena = Arena::new(vec![seed_a, seed_b], &ro);

        // the pipe reaches the birds' x on the fourth tick
        for _ in 0..4 {
            arena.update(&ro);
        }

        assert_eq!(arena.score(), 1);
        // a fresh pipe has already been spawned to keep the stream ahead
        assert_eq!(arena.pipes().len(), 2);

        let expected = 4. * ro.survival_reward + ro.pass_bonus;
        assert_relative_eq!(fitness_a.get(), expected, epsilon = 1e-4_f32);
        assert_relative_eq!(fitness_b.get(), expected, epsilon = 1e-4_f32);

        // the passed flag holds: two more ticks must not re-score
        arena.update(&ro);
        arena.update(&ro);
        assert_eq!(arena.score(), 1);
    }

    #[test]
    fn retired_pipe_is_gone_on_the_next_tick() {
        let mut ro = RunOptions::default();
        ro.rng_seed = Some(7);
        ro.pipe_initial_x = 0.;

        let (seed, _fitness) = seed_with(Box::new(Still));
        let mut arena = Arena::new(vec![seed], &ro);

        // x = 0 - 5*16 = -80, right edge past the boundary on tick 16
        for _ in 0..16 {
            arena.update(&ro);
        }

        assert!(arena.is_running());
        assert_eq!(arena.pipes().len(), 1);
        assert!(arena.pipes()[0].x > 0.);
    }

    #[test]
    fn simultaneous_out_of_bounds_terminates_with_no_further_ticks() {
        let ro = RunOptions::default();
        let seeds: Vec<AgentSeed> = (0..3)
            .map(|_| seed_with(Box::new(Flapper)).0)
            .collect();
        let mut arena = Arena::new(seeds, &ro);

        // perpetual jumping climbs 11 px per tick; everyone crosses y = 0
        // on the same tick
        let mut guard = 0;
        while arena.is_running() && guard < 50 {
            arena.update(&ro);
            guard += 1;
        }

        assert_eq!(arena.live_count(), 0);
        let terminal_ticks = arena.ticks();
        let terminal_score = arena.score();

        arena.update(&ro);
        assert_eq!(arena.ticks(), terminal_ticks);
        assert_eq!(arena.score(), terminal_score);
    }

    #[test]
    fn non_finite_controller_output_means_no_jump() {
        let ro = RunOptions::default();
        let (seed, _fitness) = seed_with(Box::new(Broken));
        let mut arena = Arena::new(vec![seed], &ro);

        arena.update(&ro);

        let bird = arena.view().next().map(|a| a.bird).unwrap();
        assert_relative_eq!(bird.position.y, 201.5, epsilon = 1e-5_f32);
    }

    #[test]
    fn agents_keep_stable_ids_and_shared_fitness_cells() {
        let ro = RunOptions::default();
        let mut cells = Vec::new();
        let seeds: Vec<AgentSeed> = (0..3)
            .map(|_| {
                let (seed, cell) = seed_with(Box::new(Still));
                cells.push(cell);
                seed
            })
            .collect();
        let mut arena = Arena::new(seeds, &ro);

        arena.update(&ro);

        let ids: Vec<usize> = arena.view().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        // the cells handed in are the very cells the arena mutates
        for cell in &cells {
            assert_relative_eq!(cell.get(), ro.survival_reward, epsilon = 1e-5_f32);
            assert_eq!(Rc::strong_count(cell), 2);
        }
    }
}
