// Population-insertion records.
//
// A record places a batch of animals on one cell:
//
//   { "loc": { "row": 2, "col": 3 },
//     "pop": [ { "species": "Herbivore", "age": 5, "weight": 20.0 }, ... ] }
//
// `weight` may be omitted, in which case the animal gets a sampled birth
// weight when it is created. Records are plain serde data; placing them is
// `SimState::add_population_records`, which keeps the replace-not-append
// contract of `Habitat::add_population` per species.

use serde::{Deserialize, Serialize};

use crate::types::{Coord, Species};

/// Age and optional weight of one animal to insert. The species is implied
/// by the list the entry is passed in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimalEntry {
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl AnimalEntry {
    pub fn new(age: u32, weight: f64) -> Self {
        Self {
            age,
            weight: Some(weight),
        }
    }
}

/// One entry of a record's `pop` list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub species: Species,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// A batch of animals for a single cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub loc: Coord,
    pub pop: Vec<RecordEntry>,
}

impl PopulationRecord {
    /// Parse a JSON array of records.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Entries of one species, in record order.
    pub fn entries(&self, species: Species) -> Vec<AnimalEntry> {
        self.pop
            .iter()
            .filter(|e| e.species == species)
            .map(|e| AnimalEntry {
                age: e.age,
                weight: e.weight,
            })
            .collect()
    }
}
