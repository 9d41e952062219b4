//! The falling pair: an axis puyo and a satellite orbiting it

use crate::color::Color;
use crate::grid::Pos;
use serde::{Deserialize, Serialize};

/// Which side of the axis the satellite sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

/// Direction of a rotation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Rotation state as 0..=3 (up, right, down, left)
    pub fn index(&self) -> u8 {
        match self {
            Rotation::Up => 0,
            Rotation::Right => 1,
            Rotation::Down => 2,
            Rotation::Left => 3,
        }
    }

    /// Unit offset of the satellite from the axis (y grows downward)
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Rotation::Up => (0, -1),
            Rotation::Right => (1, 0),
            Rotation::Down => (0, 1),
            Rotation::Left => (-1, 0),
        }
    }

    fn from_offset(offset: (i32, i32)) -> Self {
        match offset {
            (0, -1) => Rotation::Up,
            (1, 0) => Rotation::Right,
            (0, 1) => Rotation::Down,
            (-1, 0) => Rotation::Left,
            other => unreachable!("satellite offset {other:?} is not a unit vector"),
        }
    }

    /// Rotate the offset vector 90 degrees: `(x, y) -> (-y, x)` clockwise,
    /// `(x, y) -> (y, -x)` counter-clockwise.
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let (x, y) = self.offset();
        match direction {
            RotationDirection::Clockwise => Self::from_offset((-y, x)),
            RotationDirection::CounterClockwise => Self::from_offset((y, -x)),
        }
    }

    pub fn cw(&self) -> Self {
        self.rotated(RotationDirection::Clockwise)
    }

    pub fn ccw(&self) -> Self {
        self.rotated(RotationDirection::CounterClockwise)
    }
}

/// A falling pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    /// Color of the axis puyo (the one the player moves)
    pub axis_color: Color,
    /// Color of the satellite puyo
    pub satellite_color: Color,
    /// Grid position of the axis
    pub pos: Pos,
    /// Current rotation state
    pub rotation: Rotation,
}

impl Pair {
    /// Create a pair with the satellite above the axis
    pub fn new(axis_color: Color, satellite_color: Color, pos: Pos) -> Self {
        Self {
            axis_color,
            satellite_color,
            pos,
            rotation: Rotation::Up,
        }
    }

    /// Position of the satellite puyo
    pub fn satellite_pos(&self) -> Pos {
        let (dx, dy) = self.rotation.offset();
        self.pos.offset(dx, dy)
    }

    /// Both puyos with their positions, axis first
    pub fn cells(&self) -> [(Pos, Color); 2] {
        [
            (self.pos, self.axis_color),
            (self.satellite_pos(), self.satellite_color),
        ]
    }

    /// A copy moved by `(dx, dy)`; no collision checks
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            pos: self.pos.offset(dx, dy),
            ..*self
        }
    }

    /// A copy rotated in place around the axis; no collision checks
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            rotation: self.rotation.rotated(direction),
            ..*self
        }
    }
}
