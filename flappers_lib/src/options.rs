use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// horizontal position shared by every bird, fixed for a run
    pub bird_x: f32,
    pub bird_start_y: f32,

    pub gravity: f32,
    /// largest downward displacement a bird can accrue in one tick
    pub terminal_velocity: f32,
    /// impulse velocity applied by a jump, negative is up
    pub jump_velocity: f32,
    /// extra displacement subtracted while the computed displacement is
    /// still negative, makes the upward arc snappier than the fall
    pub rising_boost: f32,

    pub max_tilt_up: f32,
    pub max_tilt_down: f32,
    pub tilt_decay: f32,
    /// band above the last jump origin within which the bird keeps its nose up
    pub tilt_grace: f32,
    /// ticks per wing animation frame
    pub animation_time: u32,
    /// tilt at or below which the wing animation pins to the glide frame
    pub nose_dive_tilt: f32,

    pub pipe_gap: f32,
    pub pipe_velocity: f32,
    /// gap top edge is drawn uniformly from [pipe_spawn_min, pipe_spawn_max)
    pub pipe_spawn_min: f32,
    pub pipe_spawn_max: f32,
    /// x of the pipe seeded before the first tick
    pub pipe_initial_x: f32,
    /// x at which every later pipe spawns
    pub pipe_spawn_x: f32,

    pub ground_velocity: f32,
    pub ground_tile_width: f32,

    pub survival_reward: f32,
    pub pass_bonus: f32,
    pub collision_penalty: f32,
    pub jump_threshold: f32,

    pub window: WindowSize,
    pub save_options: SaveOptions,

    /// fixed seed for the obstacle stream, None draws one from entropy
    pub rng_seed: Option<u64>,
    pub sample_rate: u64,
}

impl RunOptions {
    /// Checks the tunables describe a playable field before a run starts.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.window.ground_y >= self.window.win_h as f32 {
            return Err(SimError::InvalidOptions(
                "ground_y must sit inside the window".to_owned(),
            ));
        }
        if self.pipe_spawn_min <= 0. || self.pipe_spawn_min >= self.pipe_spawn_max {
            return Err(SimError::InvalidOptions(
                "pipe spawn band must be non-empty and below the top edge".to_owned(),
            ));
        }
        if self.pipe_spawn_max + self.pipe_gap >= self.window.ground_y {
            return Err(SimError::InvalidOptions(
                "pipe spawn band plus gap must stay above the ground".to_owned(),
            ));
        }
        if self.pipe_velocity <= 0. || self.ground_velocity <= 0. {
            return Err(SimError::InvalidOptions(
                "scroll velocities must be positive".to_owned(),
            ));
        }
        if !self.jump_threshold.is_finite() {
            return Err(SimError::InvalidOptions(
                "jump_threshold must be finite".to_owned(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(SimError::InvalidOptions(
                "sample_rate must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        let init_width = 400;
        let init_height = 700;
        let ground_y = 600.;

        let gravity = 1.5;
        let terminal_velocity = 16.;
        let jump_velocity = -10.5;
        let rising_boost = 2.;

        let pipe_gap = 150.;
        let pipe_velocity = 5.;

        RunOptions {
            bird_x: 150.,
            bird_start_y: 200.,
            gravity,
            terminal_velocity,
            jump_velocity,
            rising_boost,
            max_tilt_up: 25.,
            max_tilt_down: -90.,
            tilt_decay: 20.,
            tilt_grace: 50.,
            animation_time: 5,
            nose_dive_tilt: -80.,
            pipe_gap,
            pipe_velocity,
            pipe_spawn_min: 50.,
            pipe_spawn_max: 350.,
            pipe_initial_x: 600.,
            pipe_spawn_x: 500.,
            ground_velocity: pipe_velocity,
            ground_tile_width: 504.,
            survival_reward: 0.1,
            pass_bonus: 5.,
            collision_penalty: 1.,
            jump_threshold: 0.5,
            window: get_window_size(init_width, init_height, ground_y),
            save_options: SaveOptions {
                save_locations: false,
                save_locations_path: Some("./".to_owned()),
                save_locations_timestamp: true,
            },
            rng_seed: None,
            sample_rate: 1,
        }
    }
}

pub fn get_window_size(init_width: u32, init_height: u32, ground_y: f32) -> WindowSize {
    WindowSize {
        win_w: init_width as i32,
        win_h: init_height as i32,
        ground_y,
    }
}

/// Play field bounds, top-left origin with y growing downwards.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct WindowSize {
    /// width
    pub win_w: i32,
    /// height
    pub win_h: i32,
    /// y of the ground line, birds touching it die
    pub ground_y: f32,
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub save_locations: bool,
    pub save_locations_path: Option<String>,
    pub save_locations_timestamp: bool,
}
