//! Column compaction after puyos pop

use crate::color::Cell;
use crate::grid::{Grid, Pos};

/// Compact every column in place. Returns true if any puyo moved.
///
/// Each column is settled completely in one call: puyos keep their relative
/// order and the vacated cells at the top become empty.
pub fn settle(grid: &mut Grid) -> bool {
    let mut moved = false;

    for x in 0..grid.width() as i32 {
        // Write pointer walks up from the floor
        let mut write_y = grid.height() as i32 - 1;
        for read_y in (0..grid.height() as i32).rev() {
            let Some(cell @ Cell::Filled(_)) = grid.get(Pos::new(x, read_y)) else {
                continue;
            };
            if read_y != write_y {
                grid.set(Pos::new(x, write_y), cell);
                grid.set(Pos::new(x, read_y), Cell::Empty);
                moved = true;
            }
            write_y -= 1;
        }
    }

    moved
}

/// Pure form of [`settle`]: returns the settled grid and whether anything fell
pub fn apply_gravity(grid: &Grid) -> (Grid, bool) {
    let mut settled = grid.clone();
    let moved = settle(&mut settled);
    (settled, moved)
}
