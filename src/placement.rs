//! Collision checks, movement and wall kicks for the falling pair

use crate::grid::{Grid, Pos};
use crate::pair::{Pair, RotationDirection};

/// Axis shifts tried, in order, when a rotation collides: left, right, then
/// up one row off the floor or stack
pub const KICK_OFFSETS: [(i32, i32); 3] = [(-1, 0), (1, 0), (0, -1)];

/// Check a single puyo position.
///
/// Columns must be inside the grid and rows above the bottom. Rows above the
/// visible top (`y < 0`) are legal and never collide.
pub fn is_open(grid: &Grid, pos: Pos) -> bool {
    if pos.x < 0 || pos.x >= grid.width() as i32 {
        return false;
    }
    if pos.y >= grid.height() as i32 {
        return false;
    }
    pos.y < 0 || grid.is_vacant(pos)
}

/// Check if both puyos of the pair can occupy their positions
pub fn can_place(grid: &Grid, pair: &Pair) -> bool {
    pair.cells().iter().all(|&(pos, _)| is_open(grid, pos))
}

/// Translate the pair, returning the moved pair only if it fits
pub fn try_move(grid: &Grid, pair: &Pair, dx: i32, dy: i32) -> Option<Pair> {
    debug_assert!(
        dx.abs() + dy.abs() <= 1 && dy >= 0,
        "moves are unit steps sideways or down, got ({dx}, {dy})"
    );
    let moved = pair.translated(dx, dy);
    can_place(grid, &moved).then_some(moved)
}

/// Rotate the pair around its axis, kicking off walls and stacks if needed.
///
/// Tries the rotation in place, then with the axis shifted by each of
/// [`KICK_OFFSETS`]. Returns `None` if no candidate fits.
pub fn try_rotate(grid: &Grid, pair: &Pair, direction: RotationDirection) -> Option<Pair> {
    let rotated = pair.rotated(direction);
    if can_place(grid, &rotated) {
        return Some(rotated);
    }

    KICK_OFFSETS
        .iter()
        .map(|&(dx, dy)| rotated.translated(dx, dy))
        .find(|kicked| can_place(grid, kicked))
}

/// Number of rows the pair can fall before landing
pub fn drop_distance(grid: &Grid, pair: &Pair) -> i32 {
    let mut distance = 0;
    while can_place(grid, &pair.translated(0, distance + 1)) {
        distance += 1;
    }
    distance
}
