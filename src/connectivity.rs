//! Same-color group detection
//!
//! Groups are found with an iterative flood fill over 4-directional
//! neighbours, so board size never bounds recursion depth.

use crate::color::{Cell, Color};
use crate::grid::{Grid, Pos};

/// Minimum connected same-color puyos that pop
pub const ERASE_THRESHOLD: usize = 4;

const NEIGHBOURS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// A connected same-color set of at least [`ERASE_THRESHOLD`] puyos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseGroup {
    pub color: Color,
    /// Member positions, sorted row-major
    pub positions: Vec<Pos>,
}

impl EraseGroup {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Collect the connected component containing `start`.
///
/// Marks every member in `visited` (indexed row-major). Returns an empty
/// vector if `start` is empty or out of bounds.
pub fn connected_component(grid: &Grid, start: Pos, visited: &mut [bool]) -> Vec<Pos> {
    let Some(Cell::Filled(color)) = grid.get(start) else {
        return Vec::new();
    };
    let width = grid.width();
    let idx = |pos: Pos| pos.y as usize * width + pos.x as usize;

    let mut component = Vec::new();
    let mut stack = vec![start];
    visited[idx(start)] = true;

    while let Some(pos) = stack.pop() {
        component.push(pos);
        for (dx, dy) in NEIGHBOURS {
            let next = pos.offset(dx, dy);
            if grid.get(next) == Some(Cell::Filled(color)) && !visited[idx(next)] {
                visited[idx(next)] = true;
                stack.push(next);
            }
        }
    }

    component.sort();
    component
}

/// Find every group that should pop.
///
/// Scans cells in row-major order and flood-fills each unvisited puyo. Groups
/// are disjoint and returned in order of their first cell.
pub fn find_groups(grid: &Grid) -> Vec<EraseGroup> {
    let mut visited = vec![false; grid.area()];
    let mut groups = Vec::new();

    for pos in grid.positions() {
        let i = pos.y as usize * grid.width() + pos.x as usize;
        if visited[i] {
            continue;
        }
        let Some(Cell::Filled(color)) = grid.get(pos) else {
            continue;
        };

        let positions = connected_component(grid, pos, &mut visited);
        if positions.len() >= ERASE_THRESHOLD {
            groups.push(EraseGroup { color, positions });
        }
    }

    groups
}
