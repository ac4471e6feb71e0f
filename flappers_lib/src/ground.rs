use crate::options::RunOptions;

/// Two tiles scrolling left in lockstep with the pipes; whichever tile fully
/// leaves the screen wraps back behind the other, faking an infinite strip.
/// Purely cosmetic: the death-on-ground rule lives in the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct Ground {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
}

impl Ground {
    pub fn new(run_options: &RunOptions) -> Self {
        Ground {
            x1: 0.,
            x2: run_options.ground_tile_width,
            y: run_options.window.ground_y,
        }
    }

    pub fn advance(&mut self, run_options: &RunOptions) {
        let width = run_options.ground_tile_width;

        self.x1 -= run_options.ground_velocity;
        self.x2 -= run_options.ground_velocity;

        if self.x1 + width < 0. {
            self.x1 = self.x2 + width;
        }
        if self.x2 + width < 0. {
            self.x2 = self.x1 + width;
        }
    }
}
