//! Color generation for new pairs
//!
//! Randomness sits behind [`ColorSource`] so the engine can be driven by a
//! seeded RNG in play and by a fixed script in tests.

use crate::color::Color;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Supplier of puyo colors
pub trait ColorSource {
    /// Pick the next color from `palette` (never empty)
    fn next_color(&mut self, palette: &[Color]) -> Color;
}

/// Uniform picks from a seeded ChaCha RNG
#[derive(Debug, Clone)]
pub struct RandomColors {
    rng: ChaCha8Rng,
}

impl RandomColors {
    /// Deterministic source for a seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ColorSource for RandomColors {
    fn next_color(&mut self, palette: &[Color]) -> Color {
        palette[self.rng.gen_range(0..palette.len())]
    }
}

/// Replays a fixed color sequence, cycling when it runs out.
///
/// Colors outside the palette are passed through unchanged.
#[derive(Debug, Clone)]
pub struct ScriptedColors {
    script: Vec<Color>,
    cursor: usize,
}

impl ScriptedColors {
    pub fn new(script: impl Into<Vec<Color>>) -> Self {
        let script = script.into();
        debug_assert!(!script.is_empty(), "color script must not be empty");
        Self { script, cursor: 0 }
    }
}

impl ColorSource for ScriptedColors {
    fn next_color(&mut self, palette: &[Color]) -> Color {
        let Some(&color) = self.script.get(self.cursor % self.script.len().max(1)) else {
            return palette[0];
        };
        self.cursor += 1;
        color
    }
}

/// Upcoming pair colors as `(axis, satellite)`
#[derive(Debug, Clone)]
pub struct PairQueue<S> {
    source: S,
    palette: &'static [Color],
    /// Preview queue for upcoming pairs
    queue: VecDeque<(Color, Color)>,
    preview_len: usize,
}

impl<S: ColorSource> PairQueue<S> {
    /// Create a queue that always holds `preview_len` pairs after the current one
    pub fn new(source: S, palette: &'static [Color], preview_len: usize) -> Self {
        let mut queue = Self {
            source,
            palette,
            queue: VecDeque::with_capacity(preview_len + 1),
            preview_len,
        };
        queue.refill();
        queue
    }

    /// Take the next pair's colors
    pub fn next(&mut self) -> (Color, Color) {
        self.refill();
        let pair = self.queue.pop_front().unwrap_or_else(|| self.draw());
        self.refill();
        pair
    }

    /// Preview upcoming pairs without removing them
    pub fn preview(&self) -> impl Iterator<Item = (Color, Color)> + '_ {
        self.queue.iter().copied().take(self.preview_len)
    }

    /// Drop queued pairs and draw fresh ones (used on restart)
    pub fn reset(&mut self) {
        self.queue.clear();
        self.refill();
    }

    fn draw(&mut self) -> (Color, Color) {
        let axis = self.source.next_color(self.palette);
        let satellite = self.source.next_color(self.palette);
        (axis, satellite)
    }

    fn refill(&mut self) {
        while self.queue.len() < self.preview_len.max(1) {
            let pair = self.draw();
            self.queue.push_back(pair);
        }
    }
}
