//! Static tile grid
//!
//! The grid is parsed once from a text layout and never changes afterwards.
//! Row/column indices times `TILE_SIZE` give world coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TILE_SIZE;

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Open,
    Pellet,
    PowerPellet,
}

impl CellKind {
    /// Layout character mapping: `w`/`#` wall, space open, `.` pellet, `P`/`o` power pellet
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'w' | '#' => Some(CellKind::Wall),
            ' ' => Some(CellKind::Open),
            '.' => Some(CellKind::Pellet),
            'P' | 'o' => Some(CellKind::PowerPellet),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            CellKind::Wall => 'w',
            CellKind::Open => ' ',
            CellKind::Pellet => '.',
            CellKind::PowerPellet => 'P',
        }
    }

    #[inline]
    pub fn is_wall(self) -> bool {
        self == CellKind::Wall
    }
}

/// Layout parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no cells")]
    Empty,
    #[error("row {row} has {actual} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown cell character {ch:?} at row {row}, column {col}")]
    UnknownCell { ch: char, row: usize, col: usize },
    #[error("tunnel row {row} is outside the {rows}-row grid")]
    TunnelOutOfRange { row: usize, rows: usize },
    #[error("tunnel row {row} is walled at the grid edge")]
    TunnelBlocked { row: usize },
}

/// Immutable wall/pellet grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    /// Row-major cells
    cells: Vec<CellKind>,
    /// Rows whose left/right edges wrap around
    tunnel_rows: Vec<usize>,
}

impl Grid {
    /// Parse a rectangular layout (one string per row)
    pub fn parse<S: AsRef<str>>(layout: &[S]) -> Result<Self, LayoutError> {
        let rows = layout.len();
        let cols = layout.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(LayoutError::Empty);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            let actual = line.chars().count();
            if actual != cols {
                return Err(LayoutError::Ragged {
                    row,
                    expected: cols,
                    actual,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let kind =
                    CellKind::from_char(ch).ok_or(LayoutError::UnknownCell { ch, row, col })?;
                cells.push(kind);
            }
        }

        Ok(Self {
            cols,
            rows,
            cells,
            tunnel_rows: Vec::new(),
        })
    }

    /// Enable horizontal wrapping on the given rows. Both edge cells must be open.
    pub fn with_tunnels(mut self, tunnel_rows: &[usize]) -> Result<Self, LayoutError> {
        for &row in tunnel_rows {
            if row >= self.rows {
                return Err(LayoutError::TunnelOutOfRange {
                    row,
                    rows: self.rows,
                });
            }
            let left = self.cells[row * self.cols];
            let right = self.cells[row * self.cols + self.cols - 1];
            if left.is_wall() || right.is_wall() {
                return Err(LayoutError::TunnelBlocked { row });
            }
        }
        let mut rows = tunnel_rows.to_vec();
        rows.sort_unstable();
        rows.dedup();
        self.tunnel_rows = rows;
        Ok(self)
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tunnel_rows(&self) -> &[usize] {
        &self.tunnel_rows
    }

    /// Cell at (col, row), `None` outside the grid
    pub fn cell(&self, col: usize, row: usize) -> Option<CellKind> {
        if col < self.cols && row < self.rows {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn is_tunnel_row(&self, row: i32) -> bool {
        row >= 0 && self.tunnel_rows.contains(&(row as usize))
    }

    /// Wall test for any integer cell, including cells off the grid.
    ///
    /// Off-grid cells are solid, except beyond the left/right edge of a tunnel row.
    pub fn is_wall(&self, col: i32, row: i32) -> bool {
        if row < 0 || row as usize >= self.rows {
            return true;
        }
        if col < 0 || col as usize >= self.cols {
            return !self.is_tunnel_row(row);
        }
        self.cells[row as usize * self.cols + col as usize].is_wall()
    }

    /// Vertical extents (top, bottom) of every tunnel band in world units
    pub fn tunnel_bands(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.tunnel_rows.iter().map(|&row| {
            let top = row as f32 * TILE_SIZE;
            (top, top + TILE_SIZE)
        })
    }

    pub fn world_width(&self) -> f32 {
        self.cols as f32 * TILE_SIZE
    }

    pub fn world_height(&self) -> f32 {
        self.rows as f32 * TILE_SIZE
    }

    /// All cells in row-major order as (col, row, kind)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CellKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &kind)| (i % self.cols, i / self.cols, kind))
    }

    /// The layout as text rows (round-trips through `parse`)
    pub fn to_layout(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.as_char()).collect())
            .collect()
    }
}

/// World position of a tile's top-left corner
#[inline]
pub fn tile_origin(col: usize, row: usize) -> Vec2 {
    Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE)
}

/// World position of a tile's centre
#[inline]
pub fn tile_center(col: usize, row: usize) -> Vec2 {
    tile_origin(col, row) + Vec2::splat(TILE_SIZE / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: [&str; 4] = ["wwwww", "w.P w", "     ", "wwwww"];

    #[test]
    fn test_parse_cell_kinds() {
        let grid = Grid::parse(&LAYOUT).unwrap();
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cell(0, 0), Some(CellKind::Wall));
        assert_eq!(grid.cell(1, 1), Some(CellKind::Pellet));
        assert_eq!(grid.cell(2, 1), Some(CellKind::PowerPellet));
        assert_eq!(grid.cell(3, 1), Some(CellKind::Open));
        assert_eq!(grid.cell(5, 1), None);
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Grid::parse(&["www", "w w", "ww"]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Ragged {
                row: 2,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_cells() {
        let err = Grid::parse(&["wxw"]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnknownCell {
                ch: 'x',
                row: 0,
                col: 1
            }
        );
        assert_eq!(Grid::parse::<&str>(&[]).unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn test_off_grid_cells_are_walls_except_tunnels() {
        let grid = Grid::parse(&LAYOUT).unwrap().with_tunnels(&[2]).unwrap();
        assert!(grid.is_wall(-1, 1));
        assert!(grid.is_wall(2, -1));
        assert!(grid.is_wall(2, 4));
        assert!(!grid.is_wall(-1, 2));
        assert!(!grid.is_wall(5, 2));
        assert!(!grid.is_wall(3, 1));
    }

    #[test]
    fn test_tunnel_rows_must_be_open_at_edges() {
        let grid = Grid::parse(&LAYOUT).unwrap();
        assert_eq!(
            grid.clone().with_tunnels(&[1]).unwrap_err(),
            LayoutError::TunnelBlocked { row: 1 }
        );
        assert_eq!(
            grid.with_tunnels(&[9]).unwrap_err(),
            LayoutError::TunnelOutOfRange { row: 9, rows: 4 }
        );
    }

    #[test]
    fn test_layout_round_trip() {
        let grid = Grid::parse(&LAYOUT).unwrap();
        assert_eq!(grid.to_layout(), LAYOUT.to_vec());
        assert_eq!(grid.world_width(), 200.0);
        assert_eq!(tile_center(1, 1), Vec2::new(60.0, 60.0));
    }
}
