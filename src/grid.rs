//! Grid representation and bounds-checked cell access

use crate::color::{Cell, Color};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical playfield dimensions
pub const GRID_WIDTH: usize = 6;
pub const GRID_HEIGHT: usize = 12;

/// A grid coordinate. `x` is the column, `y` the row (0 = top, growing downward).
///
/// Rows above the visible top are negative; such positions are never stored in
/// a [`Grid`] but are legal for a falling pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// The playfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major, row 0 is the top
    cells: Vec<Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl Grid {
    /// Create an empty grid. Both sides are at least one cell; zero is
    /// raised to one.
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Build a grid from text rows, top row first.
    ///
    /// `.` is empty and `R G B Y P` are colors. Returns `None` for ragged rows
    /// or unknown characters.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.chars().count();
        if width == 0 {
            return None;
        }

        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return None;
            }
            for (x, c) in row.chars().enumerate() {
                let cell = match c {
                    '.' => Cell::Empty,
                    c => Cell::Filled(Color::from_char(c)?),
                };
                grid.cells[y * width + x] = cell;
            }
        }
        Some(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Check whether a coordinate addresses a stored cell
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Get the cell at a position
    /// Returns None if out of bounds
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, pos: Pos, cell: Cell) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// True if the position is inside the grid and holds nothing
    pub fn is_vacant(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(Cell::Empty))
    }

    /// Check if the grid is completely empty (for all-clear detection)
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_filled()).count()
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width)
    }

    /// Iterate over every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let c = cell.color().map_or('.', |color| color.as_char());
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::default();
        assert!(grid.is_empty());
        assert_eq!(grid.width(), GRID_WIDTH);
        assert_eq!(grid.height(), GRID_HEIGHT);
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_zero_sized_grid_is_raised_to_one_cell() {
        let grid = Grid::new(0, 0);
        assert_eq!((grid.width(), grid.height()), (1, 1));
        assert_eq!(grid.to_string(), ".");
        assert_eq!(grid.rows().count(), 1);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::default();
        assert!(grid.set(Pos::new(5, 5), Cell::Filled(Color::Red)));
        assert_eq!(grid.get(Pos::new(5, 5)), Some(Cell::Filled(Color::Red)));
        assert!(!grid.is_empty());
        assert_eq!(grid.filled_count(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::default();
        assert_eq!(grid.get(Pos::new(-1, 0)), None);
        assert_eq!(grid.get(Pos::new(0, -1)), None);
        assert_eq!(grid.get(Pos::new(GRID_WIDTH as i32, 0)), None);
        assert_eq!(grid.get(Pos::new(0, GRID_HEIGHT as i32)), None);
        assert!(!grid.set(Pos::new(0, GRID_HEIGHT as i32), Cell::Filled(Color::Blue)));
        assert!(!grid.is_vacant(Pos::new(-1, 3)));
    }

    #[test]
    fn test_from_rows_round_trips_through_display() {
        let rows = ["..R", "GB.", "YYP"];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(Pos::new(2, 0)), Some(Cell::Filled(Color::Red)));
        assert_eq!(grid.to_string(), "..R\nGB.\nYYP");
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(Grid::from_rows(&["..", "..."]).is_none());
        assert!(Grid::from_rows(&[".X"]).is_none());
        assert!(Grid::from_rows(&[]).is_none());
    }

    #[test]
    fn test_positions_are_row_major() {
        let grid = Grid::new(2, 2);
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(
            positions,
            vec![Pos::new(0, 0), Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)]
        );
    }
}
