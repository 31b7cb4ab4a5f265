// Island layout: the grid of landscape kinds parsed from the layout text.
//
// The map is stored as a flat `Vec<Landscape>` indexed row-major by
// `(row - 1) * cols + (col - 1)`, so coordinates are 1-based like the layout
// text itself. `SimState` keeps a parallel `Vec<Habitat>` with the same
// indexing; `IslandMap::index()` is the single place that mapping lives.
//
// Parsing validates everything up front: at least one row, only the symbols
// `W L H D`, every row as long as the first, and water along the whole
// border (first/last row, first/last column). Any violation is returned as a
// `LayoutError` and no map is produced. Surrounding whitespace on the text and
// on each line is ignored, so indented raw-string layouts parse as written.
//
// Because the border is water, every cell that accepts animals has all four
// cardinal neighbors inside the grid. `neighbors()` returns them in the fixed
// migration draw order: west, east, south, north.
//
// See also: `habitat.rs` which stores the resolved neighbor coordinates,
// `sim.rs` which builds one `Habitat` per cell from this map.

use std::fmt;

use crate::error::LayoutError;
use crate::types::{Coord, Landscape};

/// `(d_row, d_col)` offsets in migration draw order: west, east, south, north.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// Rectangular grid of landscape kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IslandMap {
    /// Flat storage: index = (row - 1) * cols + (col - 1).
    cells: Vec<Landscape>,
    rows: u32,
    cols: u32,
}

impl IslandMap {
    /// Parse and validate a layout string.
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = layout.trim().lines().map(str::trim).collect();
        let Some(first) = lines.first().filter(|l| !l.is_empty()) else {
            return Err(LayoutError::Empty);
        };
        let expected = first.chars().count();

        let mut cells = Vec::with_capacity(lines.len() * expected);
        for (r, line) in lines.iter().enumerate() {
            let row = r as u32 + 1;
            let found = line.chars().count();
            if found != expected {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }
            for (c, symbol) in line.chars().enumerate() {
                let kind = Landscape::from_symbol(symbol).ok_or(LayoutError::UnknownSymbol {
                    row,
                    col: c as u32 + 1,
                    symbol,
                })?;
                cells.push(kind);
            }
        }

        let map = Self {
            cells,
            rows: lines.len() as u32,
            cols: expected as u32,
        };
        map.check_border()?;
        Ok(map)
    }

    fn check_border(&self) -> Result<(), LayoutError> {
        for coord in self.coords() {
            let on_border = coord.row == 1
                || coord.row == self.rows
                || coord.col == 1
                || coord.col == self.cols;
            if !on_border {
                continue;
            }
            let kind = self.cells[self.flat(coord)];
            if kind != Landscape::Water {
                return Err(LayoutError::NonWaterBorder {
                    row: coord.row,
                    col: coord.col,
                    symbol: kind.symbol(),
                });
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells, water included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Never true for a parsed map.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        (1..=self.rows).contains(&coord.row) && (1..=self.cols).contains(&coord.col)
    }

    // Caller guarantees `in_bounds(coord)`.
    fn flat(&self, coord: Coord) -> usize {
        (coord.row - 1) as usize * self.cols as usize + (coord.col - 1) as usize
    }

    /// Flat row-major index of a coordinate. Returns `None` if out of bounds.
    pub fn index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord).then(|| self.flat(coord))
    }

    /// Landscape kind at `coord`, or `None` off the map.
    pub fn landscape(&self, coord: Coord) -> Option<Landscape> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// All coordinates in row-major order (row 1 first, columns ascending).
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let cols = self.cols;
        (1..=self.rows).flat_map(move |row| (1..=cols).map(move |col| Coord::new(row, col)))
    }

    /// `(coord, kind)` for every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Landscape)> {
        self.coords().zip(self.cells.iter().copied())
    }

    /// Number of cells that accept animals.
    pub fn habitable_count(&self) -> usize {
        self.cells.iter().filter(|k| k.accepts_animals()).count()
    }

    /// Cardinal neighbors of `coord` in migration draw order. Entries off the
    /// map are `None`; for cells that accept animals all four are present.
    pub fn neighbors(&self, coord: Coord) -> [Option<Coord>; 4] {
        NEIGHBOR_OFFSETS.map(|(d_row, d_col)| {
            coord
                .offset(d_row, d_col)
                .filter(|&n| self.in_bounds(n))
        })
    }
}

/// Renders the map back to layout text, one line per row.
impl fmt::Display for IslandMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.chunks(self.cols as usize).enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for kind in row {
                write!(f, "{kind}")?;
            }
        }
        Ok(())
    }
}
