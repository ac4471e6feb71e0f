use glam::f32::Vec2;

use crate::options::RunOptions;

/// Wing positions cycle up-level-down-level; index is the silhouette frame.
const FRAME_CYCLE: [usize; 4] = [0, 1, 2, 1];

#[derive(Debug, Clone, Copy)]
pub struct Bird {
    /// x is fixed for the whole run, y grows downwards
    pub position: Vec2,
    /// vertical velocity, negative is up
    pub velocity: f32,
    /// display-only, degrees, positive is nose up; never consulted by collision
    pub tilt: f32,
    /// wing animation frame, selects the current collision silhouette
    pub frame: usize,
    tick_count: u32,
    /// y snapshot taken at the last jump
    jump_origin: f32,
    frame_count: u32,
}

impl Bird {
    /// Creates a new [`Bird`] at rest.
    pub fn new(x: f32, y: f32) -> Self {
        Bird {
            position: Vec2::new(x, y),
            velocity: 0.,
            tilt: 0.,
            frame: 0,
            tick_count: 0,
            jump_origin: y,
            frame_count: 0,
        }
    }

    /// Applies the upward impulse, unconditionally.
    pub fn jump(&mut self, run_options: &RunOptions) {
        self.velocity = run_options.jump_velocity;
        self.tick_count = 0;
        self.jump_origin = self.position.y;
    }

    /// Advances the vertical state by one fixed tick and returns the
    /// displacement that was applied.
    pub fn integrate(&mut self, run_options: &RunOptions) -> f32 {
        self.tick_count += 1;
        let t = self.tick_count as f32;

        // d = v*t + a*t^2, with t counted since the last impulse, so a fresh
        // jump decelerates smoothly into the descent
        let mut d = self.velocity * t + run_options.gravity * t * t;

        if d >= run_options.terminal_velocity {
            d = run_options.terminal_velocity;
        }

        // still rising: boost the arc
        if d < 0. {
            d -= run_options.rising_boost;
        }

        self.position.y += d;

        if d < 0. || self.position.y < self.jump_origin + run_options.tilt_grace {
            if self.tilt < run_options.max_tilt_up {
                self.tilt = run_options.max_tilt_up;
            }
        } else if self.tilt > run_options.max_tilt_down {
            self.tilt = (self.tilt - run_options.tilt_decay).max(run_options.max_tilt_down);
        }

        self.advance_frame(run_options);

        d
    }

    fn advance_frame(&mut self, run_options: &RunOptions) {
        if self.tilt <= run_options.nose_dive_tilt {
            // nose dive glides on held-level wings
            self.frame = 1;
            self.frame_count = run_options.animation_time * 2;
            return;
        }

        self.frame_count += 1;
        let step = (self.frame_count / run_options.animation_time) as usize;
        self.frame = FRAME_CYCLE[step % FRAME_CYCLE.len()];
    }
}
