// Core types shared across the simulation.
//
// Defines grid coordinates (`Coord`), the two animal species (`Species`) and
// the four landscape kinds (`Landscape`) together with their one-letter map
// symbols. All types derive `Serialize`/`Deserialize` so configs and
// population records can name them in JSON.
//
// Coordinates are 1-based `(row, col)` pairs matching the layout text: the
// first character of the first line is `(1, 1)`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position on the island grid.
///
/// - row: north (1) to south (increasing)
/// - col: west  (1) to east  (increasing)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u32,
    pub col: u32,
}

impl Coord {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Offset by a signed `(d_row, d_col)`. Returns `None` if the result
    /// would leave the positive quadrant (row or col below 1).
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Self> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        (row >= 1 && col >= 1).then_some(Self { row, col })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u32, u32)> for Coord {
    fn from((row, col): (u32, u32)) -> Self {
        Self { row, col }
    }
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The two animal species living on the island.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Landscape kinds
// ---------------------------------------------------------------------------

/// The four landscape categories a cell can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Landscape {
    /// Impassable water. Forms the mandatory border.
    Water,
    /// Lush vegetation, the largest fodder budget.
    Lowland,
    /// Sparser vegetation.
    Highland,
    /// Barren, no fodder by default.
    Desert,
}

impl Landscape {
    pub const ALL: [Landscape; 4] = [
        Landscape::Water,
        Landscape::Lowland,
        Landscape::Highland,
        Landscape::Desert,
    ];

    /// Parse a layout symbol.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'W' => Some(Landscape::Water),
            'L' => Some(Landscape::Lowland),
            'H' => Some(Landscape::Highland),
            'D' => Some(Landscape::Desert),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Landscape::Water => 'W',
            Landscape::Lowland => 'L',
            Landscape::Highland => 'H',
            Landscape::Desert => 'D',
        }
    }

    /// Whether animals may live in or migrate into this kind of cell.
    pub fn accepts_animals(self) -> bool {
        !matches!(self, Landscape::Water)
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_roundtrip() {
        for kind in Landscape::ALL {
            assert_eq!(Landscape::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(Landscape::from_symbol('X'), None);
    }

    #[test]
    fn only_water_refuses_animals() {
        assert!(!Landscape::Water.accepts_animals());
        assert!(Landscape::Lowland.accepts_animals());
        assert!(Landscape::Highland.accepts_animals());
        assert!(Landscape::Desert.accepts_animals());
    }

    #[test]
    fn coord_offset_stays_positive() {
        let c = Coord::new(1, 2);
        assert_eq!(c.offset(0, -1), Some(Coord::new(1, 1)));
        assert_eq!(c.offset(-1, 0), None);
        assert_eq!(c.offset(0, -2), None);
        assert_eq!(c.offset(2, 3), Some(Coord::new(3, 5)));
    }

    #[test]
    fn coord_ordering_is_row_major() {
        assert!(Coord::new(1, 9) < Coord::new(2, 1));
        assert!(Coord::new(2, 1) < Coord::new(2, 2));
    }

    #[test]
    fn coord_deserializes_from_json_object() {
        let c: Coord = serde_json::from_str(r#"{"row": 3, "col": 4}"#).unwrap();
        assert_eq!(c, Coord::new(3, 4));
    }
}
