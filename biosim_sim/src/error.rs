// Error types for the fallible entry points of the simulation.
//
// - `LayoutError`: the layout text could not be turned into an island.
// - `ConfigError`: a parameter update or JSON config was rejected.
// - `PopulationError`: a population insertion targeted an invalid cell.
//
// Internal-consistency faults (fitness above 1) are not represented here;
// they are assertions, since they signal a formula or parameter defect
// rather than bad input.

use crate::types::Coord;
use thiserror::Error;

/// Structural problems found while validating an island layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout contains no rows")]
    Empty,
    #[error("row {row}, column {col}: unknown landscape symbol '{symbol}'")]
    UnknownSymbol { row: u32, col: u32, symbol: char },
    #[error("row {row} has {found} cells, expected {expected} like the first row")]
    RaggedRow {
        row: u32,
        expected: usize,
        found: usize,
    },
    #[error("row {row}, column {col}: border cell is '{symbol}', must be water 'W'")]
    NonWaterBorder { row: u32, col: u32, symbol: char },
}

/// Rejected parameter updates and config documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{target} has no parameter named '{name}'")]
    UnknownParameter { target: String, name: String },
    #[error("{target} parameter '{name}' = {value} is invalid: {reason}")]
    InvalidValue {
        target: String,
        name: String,
        value: f64,
        reason: &'static str,
    },
    #[error("config JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected population insertions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PopulationError {
    #[error("cell {0} is outside the island map")]
    OutOfBounds(Coord),
    #[error("cell {0} does not accept animals")]
    Uninhabitable(Coord),
}
