use rand::Rng;

use crate::bird::Bird;
use crate::mask::{self, PIPE_HEIGHT, PIPE_WIDTH};
use crate::options::RunOptions;

/// One top+bottom obstacle pair sharing a horizontal position and a fixed
/// vertical gap.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub x: f32,
    /// top edge of the gap, fixed for the pipe's lifetime
    pub gap_y: f32,
    /// y of the top component's top-left corner (off-screen above)
    pub top: f32,
    /// y of the bottom component's top-left corner
    pub bottom: f32,
    /// transitions false -> true exactly once, when the first live bird passes
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: f32, rng: &mut impl Rng, run_options: &RunOptions) -> Self {
        let gap_y = rng.gen_range(run_options.pipe_spawn_min..run_options.pipe_spawn_max);

        Pipe {
            x,
            gap_y,
            top: gap_y - PIPE_HEIGHT as f32,
            bottom: gap_y + run_options.pipe_gap,
            passed: false,
        }
    }

    pub fn advance(&mut self, run_options: &RunOptions) {
        self.x -= run_options.pipe_velocity;
    }

    /// Retirement rule: the right edge has fully crossed the left boundary.
    pub fn off_screen(&self) -> bool {
        self.x + (PIPE_WIDTH as f32) < 0.
    }

    /// Exact silhouette test of the bird's current wing frame against both
    /// components; tilt plays no part.
    pub fn collides(&self, bird: &Bird) -> bool {
        let bird_mask = mask::bird_mask(bird.frame);

        let dx = (self.x - bird.position.x).round() as i32;
        let bird_y = bird.position.y.round();

        let top_offset = (dx, (self.top - bird_y).round() as i32);
        let bottom_offset = (dx, (self.bottom - bird_y).round() as i32);

        bird_mask.overlap(mask::pipe_top_mask(), top_offset)
            || bird_mask.overlap(mask::pipe_bottom_mask(), bottom_offset)
    }
}
