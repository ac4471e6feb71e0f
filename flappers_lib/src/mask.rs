use lazy_static::lazy_static;

// Sprite dimensions in play-field pixels: a 34x24 bird and a 52x320 pipe,
// both upscaled by 1.5.
pub const BIRD_WIDTH: usize = 51;
pub const BIRD_HEIGHT: usize = 36;
pub const PIPE_WIDTH: usize = 78;
pub const PIPE_HEIGHT: usize = 480;

/// Rows of the pipe cap lip, which is wider than the pipe body.
const PIPE_CAP_HEIGHT: usize = 39;
/// Pixels the pipe body is inset from either side of the cap.
const PIPE_BODY_INSET: usize = 3;

/// Opaque-pixel silhouette of one sprite.
///
/// Collision is decided by overlapping two masks at the offset implied by the
/// sprites' world positions, so shapes stay exact rather than degrading to
/// bounding boxes.
#[derive(Debug, Clone)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    fn blank(width: usize, height: usize) -> Self {
        Mask {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Opacity lookup, transparent outside the sprite bounds.
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.bits[y as usize * self.width + x as usize]
    }

    fn set(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.bits[y as usize * self.width + x as usize] = true;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy);
            }
        }
    }

    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let nx = (x as f32 - cx) / rx;
                let ny = (y as f32 - cy) / ry;
                if nx * nx + ny * ny <= 1. {
                    self.set(x, y);
                }
            }
        }
    }

    pub fn flipped_vertical(&self) -> Mask {
        let mut flipped = Mask::blank(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                flipped.bits[(self.height - 1 - y) * self.width + x] =
                    self.bits[y * self.width + x];
            }
        }
        flipped
    }

    /// True iff any opaque pixel of `self` coincides with an opaque pixel of
    /// `other` once `other`'s top-left corner is placed at `offset` relative
    /// to `self`'s.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;

        let x_start = dx.max(0);
        let y_start = dy.max(0);
        let x_end = (dx + other.width as i32).min(self.width as i32);
        let y_end = (dy + other.height as i32).min(self.height as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x, y) && other.get(x - dx, y - dy) {
                    return true;
                }
            }
        }

        false
    }
}

/// Builds one wing-frame silhouette: elliptical body, beak, tail and a wing
/// blob whose vertical placement is what distinguishes the frames.
fn bird_frame(wing_row: f32) -> Mask {
    let mut mask = Mask::blank(BIRD_WIDTH, BIRD_HEIGHT);

    // body
    mask.fill_ellipse(24., 18., 17., 12.);
    // beak pokes out to the right
    mask.fill_ellipse(45., 21., 5., 3.5);
    // tail feathers to the left
    mask.fill_ellipse(5., 15., 5., 4.);
    // wing
    mask.fill_ellipse(17., wing_row, 9., 5.);

    mask
}

/// Bottom-pipe silhouette: full-width cap lip over an inset body. The top
/// pipe is this flipped vertically.
fn pipe_mask() -> Mask {
    let mut mask = Mask::blank(PIPE_WIDTH, PIPE_HEIGHT);

    mask.fill_rect(0, 0, PIPE_WIDTH as i32, PIPE_CAP_HEIGHT as i32);
    mask.fill_rect(
        PIPE_BODY_INSET as i32,
        PIPE_CAP_HEIGHT as i32,
        (PIPE_WIDTH - 2 * PIPE_BODY_INSET) as i32,
        (PIPE_HEIGHT - PIPE_CAP_HEIGHT) as i32,
    );

    mask
}

lazy_static! {
    static ref BIRD_FRAMES: [Mask; 3] = [bird_frame(10.), bird_frame(18.), bird_frame(26.)];
    static ref PIPE_BOTTOM_MASK: Mask = pipe_mask();
    static ref PIPE_TOP_MASK: Mask = PIPE_BOTTOM_MASK.flipped_vertical();
}

pub fn bird_mask(frame: usize) -> &'static Mask {
    &BIRD_FRAMES[frame.min(BIRD_FRAMES.len() - 1)]
}

pub fn pipe_top_mask() -> &'static Mask {
    &PIPE_TOP_MASK
}

pub fn pipe_bottom_mask() -> &'static Mask {
    &PIPE_BOTTOM_MASK
}
