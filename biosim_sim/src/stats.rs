// Read-only distribution helpers over the live population.
//
// Frontends plot age, weight and fitness histograms per species. This module
// turns the values `SimState::animals()` exposes into bin counts using the
// same `{ max, delta }` specs the plotting side is configured with. Bins are
// `[0, delta), [delta, 2*delta), ...` up to `max`; a value equal to `max`
// lands in the last bin, values below 0 or above `max` are not counted.

use serde::{Deserialize, Serialize};

use crate::animal::Animal;
use crate::sim::SimState;
use crate::types::Species;

/// An animal attribute that can be histogrammed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Age,
    Weight,
    Fitness,
}

impl Trait {
    pub const ALL: [Trait; 3] = [Trait::Age, Trait::Weight, Trait::Fitness];

    pub fn value(self, animal: &Animal) -> f64 {
        match self {
            Trait::Age => animal.age() as f64,
            Trait::Weight => animal.weight(),
            Trait::Fitness => animal.fitness(),
        }
    }
}

/// Histogram range and bin width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub max: f64,
    pub delta: f64,
}

impl HistogramSpec {
    /// Default plotting ranges.
    pub fn default_for(t: Trait) -> Self {
        match t {
            Trait::Age => Self {
                max: 60.0,
                delta: 2.0,
            },
            Trait::Weight => Self {
                max: 60.0,
                delta: 2.0,
            },
            Trait::Fitness => Self {
                max: 1.0,
                delta: 0.05,
            },
        }
    }

    /// Number of bins, zero for a degenerate spec.
    pub fn bins(&self) -> usize {
        let usable = self.delta > 0.0 && self.max > 0.0 && self.max.is_finite();
        if !usable {
            return 0;
        }
        (self.max / self.delta).round() as usize
    }
}

/// Bin `values` according to `spec`.
pub fn histogram(values: impl IntoIterator<Item = f64>, spec: &HistogramSpec) -> Vec<usize> {
    let bins = spec.bins();
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    for v in values {
        if !(0.0..=spec.max).contains(&v) {
            continue;
        }
        let bin = ((v / spec.delta) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
}

/// Histogram of one trait over every live animal of `species`.
pub fn trait_histogram(
    sim: &SimState,
    species: Species,
    t: Trait,
    spec: &HistogramSpec,
) -> Vec<usize> {
    histogram(sim.animals(species).map(|a| t.value(a)), spec)
}
