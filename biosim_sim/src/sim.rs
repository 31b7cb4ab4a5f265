// Island simulation state and the annual cycle.
//
// `SimState` is the single source of truth for a simulation run. It owns the
// parameter config, the PRNG, the parsed `IslandMap`, one `Habitat` per map
// cell (flat, same row-major indexing as the map) and the elapsed-year
// counter. Everything that changes the island goes through its methods.
//
// On construction (`new()`/`with_config()`), the layout is parsed and
// validated via `world.rs`, then every cell gets a `Habitat` with its four
// neighbor coordinates pre-resolved.
//
// ## Annual cycle
//
// `advance_year()` runs, strictly in this order:
//
//   1. For every habitable cell (row-major): reproduction, feeding, migration
//      intent.
//   2. Migration exchange (`migrate()`), see below.
//   3. For every habitable cell: aging, weight loss, death, eligibility reset.
//   4. Increment the year counter.
//
// Water cells are skipped in every step. Step 2 must finish before step 3
// starts, so aging and death treat every animal the same regardless of
// which cell it ended the year in.
//
// ## Migration exchange
//
// Cells are visited row-major; within a cell carnivores move first, then
// herbivores. A live resident with its intent flag set draws one of its four
// neighbors uniformly (one draw per migrant, whatever the topology). If the
// neighbor accepts animals the flag is cleared and the animal is appended to
// that cell's list, so it cannot move twice in one exchange. If the neighbor
// is water the animal stays put with its flag still set; there is no retry.
//
// See also: `habitat.rs` for the per-cell phases, `animal.rs` for the
// per-individual rules, `config.rs` for the parameters looked up at use time.
//
// **Critical constraint: determinism.** All randomness comes from the single
// `SimRng` owned here, consumed in the fixed order above. Same layout, seed,
// config and call sequence give bit-identical states every year.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::animal::Animal;
use crate::config::{ParamUpdate, SimConfig, UpdateOutcome};
use crate::error::{ConfigError, LayoutError, PopulationError};
use crate::habitat::Habitat;
use crate::population::{AnimalEntry, PopulationRecord};
use crate::prng::SimRng;
use crate::types::{Coord, Landscape, Species};
use crate::world::IslandMap;

/// Migration order within a cell.
const MIGRATION_ORDER: [Species; 2] = [Species::Carnivore, Species::Herbivore];

/// What happened during one call to `advance_year`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct YearReport {
    /// The year counter after the cycle (1 for the first simulated year).
    pub year: u32,
    pub births: usize,
    /// Animals removed by the end-of-year filter, killed prey included.
    pub deaths: usize,
    pub migrations: usize,
    pub herbivores: usize,
    pub carnivores: usize,
}

/// The simulated island.
#[derive(Clone, Debug)]
pub struct SimState {
    config: SimConfig,
    rng: SimRng,
    map: IslandMap,
    /// One habitat per map cell, indexed by `IslandMap::index()`.
    habitats: Vec<Habitat>,
    year: u32,
}

impl SimState {
    /// Build an island from `layout` with the reference parameters.
    pub fn new(layout: &str, seed: u64) -> Result<Self, LayoutError> {
        Self::with_config(layout, seed, SimConfig::default())
    }

    /// Build an island from `layout` with the given config.
    pub fn with_config(layout: &str, seed: u64, config: SimConfig) -> Result<Self, LayoutError> {
        let map = IslandMap::parse(layout)?;
        let habitats = map
            .iter()
            .map(|(coord, kind)| {
                let neighbors = if kind.accepts_animals() {
                    map.neighbors(coord)
                } else {
                    [None; 4]
                };
                Habitat::new(coord, kind, neighbors, config.fodder(kind))
            })
            .collect();
        info!(
            rows = map.rows(),
            cols = map.cols(),
            habitable = map.habitable_count(),
            seed,
            "island built"
        );
        Ok(Self {
            config,
            rng: SimRng::new(seed),
            map,
            habitats,
            year: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Annual cycle
    // -----------------------------------------------------------------------

    /// Simulate one year.
    pub fn advance_year(&mut self) -> YearReport {
        let Self {
            config,
            rng,
            habitats,
            ..
        } = self;

        let mut births = 0;
        for habitat in habitats.iter_mut().filter(|h| h.accepts_animals()) {
            births += habitat.run_reproduction_phase(config, rng);
            habitat.run_feeding_phase(config, rng);
            habitat.run_migration_intent_phase(config, rng);
        }

        let migrations = self.migrate();

        let Self {
            config,
            rng,
            habitats,
            ..
        } = self;
        let mut deaths = 0;
        for habitat in habitats.iter_mut().filter(|h| h.accepts_animals()) {
            habitat.run_aging_phase(config);
            habitat.run_weight_loss_phase(config);
            deaths += habitat.run_death_phase(config, rng);
            habitat.reset_reproductive_eligibility();
        }

        self.year += 1;
        let (herbivores, carnivores) = self.counts();
        let report = YearReport {
            year: self.year,
            births,
            deaths,
            migrations,
            herbivores,
            carnivores,
        };
        debug!(?report, "year complete");
        report
    }

    /// Move every willing migrant to a random neighbor. Returns the number
    /// of animals that changed cells.
    fn migrate(&mut self) -> usize {
        let mut moved = 0;
        for src in 0..self.habitats.len() {
            if !self.habitats[src].accepts_animals() {
                continue;
            }
            let neighbors = *self.habitats[src].neighbors();
            for species in MIGRATION_ORDER {
                let residents = std::mem::take(self.habitats[src].animals_mut(species));
                let mut staying = Vec::with_capacity(residents.len());
                for mut animal in residents {
                    if !animal.wants_to_migrate() || !animal.is_alive() {
                        staying.push(animal);
                        continue;
                    }
                    let pick = neighbors[self.rng.range_usize(0, neighbors.len())];
                    let dest = pick
                        .and_then(|c| self.map.index(c))
                        .filter(|&i| self.habitats[i].accepts_animals());
                    match dest {
                        Some(dest) => {
                            animal.finish_migration();
                            self.habitats[dest].animals_mut(species).push(animal);
                            moved += 1;
                        }
                        None => staying.push(animal),
                    }
                }
                *self.habitats[src].animals_mut(species) = staying;
            }
        }
        moved
    }

    // -----------------------------------------------------------------------
    // Population insertion
    // -----------------------------------------------------------------------

    /// Place herbivores and carnivores, each batch on its own optional cell.
    ///
    /// Each batch replaces the existing population of that species on the
    /// target cell. An omitted coordinate leaves that species untouched.
    /// Both coordinates are checked before anything is placed.
    pub fn add_population(
        &mut self,
        herb_coord: Option<Coord>,
        carn_coord: Option<Coord>,
        herb_entries: &[AnimalEntry],
        carn_entries: &[AnimalEntry],
    ) -> Result<(), PopulationError> {
        let targets = [
            (Species::Herbivore, herb_coord, herb_entries),
            (Species::Carnivore, carn_coord, carn_entries),
        ];
        let mut resolved = Vec::with_capacity(targets.len());
        for (species, coord, entries) in targets {
            if let Some(coord) = coord {
                resolved.push((species, self.habitable_index(coord)?, entries));
            }
        }
        for (species, index, entries) in resolved {
            self.habitats[index].add_population(species, entries, &self.config, &mut self.rng);
        }
        Ok(())
    }

    /// Place a batch of one species on `coord`, replacing the species'
    /// existing population there.
    pub fn add_species_population(
        &mut self,
        coord: Coord,
        species: Species,
        entries: &[AnimalEntry],
    ) -> Result<(), PopulationError> {
        let index = self.habitable_index(coord)?;
        self.habitats[index].add_population(species, entries, &self.config, &mut self.rng);
        Ok(())
    }

    /// Place every record in order. Within a record each species present is
    /// placed once, replacing what lived there before. Every target is checked
    /// before anything is placed.
    pub fn add_population_records(
        &mut self,
        records: &[PopulationRecord],
    ) -> Result<(), PopulationError> {
        for record in records {
            self.habitable_index(record.loc)?;
        }
        for record in records {
            for species in Species::ALL {
                let entries = record.entries(species);
                if entries.is_empty() {
                    continue;
                }
                self.add_species_population(record.loc, species, &entries)?;
            }
            debug!(loc = %record.loc, animals = record.pop.len(), "population placed");
        }
        Ok(())
    }

    fn habitable_index(&self, coord: Coord) -> Result<usize, PopulationError> {
        let index = self
            .map
            .index(coord)
            .ok_or(PopulationError::OutOfBounds(coord))?;
        if !self.habitats[index].accepts_animals() {
            return Err(PopulationError::Uninhabitable(coord));
        }
        Ok(index)
    }

    // -----------------------------------------------------------------------
    // Parameter updates
    // -----------------------------------------------------------------------

    /// Merge `update` into a species' parameters. Takes effect for every
    /// animal of that species from the next use onward.
    pub fn set_species_params(
        &mut self,
        species: Species,
        update: Option<&ParamUpdate>,
    ) -> Result<UpdateOutcome, ConfigError> {
        let outcome = self.config.update_species(species, update)?;
        log_update(&species.to_string(), &outcome);
        Ok(outcome)
    }

    /// Merge `update` into a landscape kind's parameters. The new fodder
    /// budget applies from the next feeding phase.
    pub fn set_landscape_params(
        &mut self,
        kind: Landscape,
        update: Option<&ParamUpdate>,
    ) -> Result<UpdateOutcome, ConfigError> {
        let outcome = self.config.update_landscape(kind, update)?;
        log_update(&format!("landscape {kind}"), &outcome);
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// Years simulated so far.
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn map(&self) -> &IslandMap {
        &self.map
    }

    pub fn habitat(&self, coord: Coord) -> Option<&Habitat> {
        self.map.index(coord).map(|i| &self.habitats[i])
    }

    /// All habitats in row-major order, water included.
    pub fn habitats(&self) -> impl Iterator<Item = &Habitat> {
        self.habitats.iter()
    }

    fn counts(&self) -> (usize, usize) {
        self.habitats.iter().fold((0, 0), |(h, c), habitat| {
            let (dh, dc) = habitat.count();
            (h + dh, c + dc)
        })
    }

    /// Total number of animals on the island.
    pub fn num_animals(&self) -> usize {
        let (h, c) = self.counts();
        h + c
    }

    pub fn num_animals_per_species(&self) -> BTreeMap<Species, usize> {
        let (h, c) = self.counts();
        BTreeMap::from([(Species::Herbivore, h), (Species::Carnivore, c)])
    }

    /// `(herbivores, carnivores)` for every cell, water included.
    pub fn animal_count_map(&self) -> BTreeMap<Coord, (usize, usize)> {
        self.habitats.iter().map(|h| (h.coord(), h.count())).collect()
    }

    /// Every live animal of a species, cells in row-major order.
    pub fn animals(&self, species: Species) -> impl Iterator<Item = &Animal> {
        self.habitats
            .iter()
            .flat_map(move |h| h.animals(species))
            .filter(|a| a.is_alive())
    }
}

fn log_update(subject: &str, outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Updated(names) => debug!(subject, ?names, "parameters updated"),
        UpdateOutcome::NoPayload => warn!(subject, "parameter update carried no payload"),
    }
}
