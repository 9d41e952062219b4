//! Engine configuration
//!
//! Loaded from the `[gameplay]` table of the settings file; every field has a
//! default so partial tables work.

use crate::color::Color;
use crate::grid::{GRID_HEIGHT, GRID_WIDTH};
use crate::score::DEFAULT_ALL_CLEAR_BONUS;
use serde::{Deserialize, Serialize};

/// Milliseconds per row of automatic fall
pub const DEFAULT_DROP_INTERVAL_MS: u32 = 1000;

/// Soft drop divides the fall interval by this
pub const DEFAULT_SOFT_DROP_DIVISOR: u32 = 10;

/// Upcoming pairs shown besides the falling one
pub const DEFAULT_PREVIEW_LEN: usize = 2;

const MIN_WIDTH: usize = 3;
const MIN_HEIGHT: usize = 2;
const MAX_SIDE: usize = 64;

/// Tunables for one engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid columns
    pub width: usize,
    /// Grid rows
    pub height: usize,
    /// How many palette colors are dealt (2-5)
    pub color_count: usize,
    /// Upcoming pairs kept visible
    pub preview_len: usize,
    /// Automatic fall interval in milliseconds per row
    pub drop_interval_ms: u32,
    /// Fall interval divisor while soft drop is held
    pub soft_drop_divisor: u32,
    /// Bonus for a resolution that empties the grid
    pub all_clear_bonus: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            color_count: 4,
            preview_len: DEFAULT_PREVIEW_LEN,
            drop_interval_ms: DEFAULT_DROP_INTERVAL_MS,
            soft_drop_divisor: DEFAULT_SOFT_DROP_DIVISOR,
            all_clear_bonus: DEFAULT_ALL_CLEAR_BONUS,
        }
    }
}

impl EngineConfig {
    /// Clamp every field into a playable range
    pub fn validated(mut self) -> Self {
        self.width = self.width.clamp(MIN_WIDTH, MAX_SIDE);
        self.height = self.height.clamp(MIN_HEIGHT, MAX_SIDE);
        self.color_count = self.color_count.clamp(2, Color::ALL.len());
        self.preview_len = self.preview_len.min(5);
        self.drop_interval_ms = self.drop_interval_ms.max(1);
        self.soft_drop_divisor = self.soft_drop_divisor.max(1);
        self
    }

    /// Colors dealt to new pairs
    pub fn palette(&self) -> &'static [Color] {
        Color::palette(self.color_count)
    }

    /// Spawn column for the axis puyo
    pub fn spawn_column(&self) -> i32 {
        (self.width as i32 - 1) / 2
    }

    /// Fall interval, shortened while soft drop is held
    pub fn fall_interval_ms(&self, soft_drop: bool) -> u32 {
        if soft_drop {
            (self.drop_interval_ms / self.soft_drop_divisor).max(1)
        } else {
            self.drop_interval_ms
        }
    }
}
