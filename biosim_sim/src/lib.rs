// biosim_sim: island predator-prey simulation library.
//
// This crate contains all simulation logic for the island model: layout
// parsing, the per-animal life cycle, per-cell phases, the annual cycle with
// its migration exchange, parameter configuration and read-only population
// queries. It has no rendering or I/O dependencies and can be tested,
// benchmarked and run headless.
//
// Module overview:
// - `sim.rs`:        Top-level SimState, annual cycle, migration exchange, queries.
// - `world.rs`:      IslandMap, the validated landscape grid (the island's spatial truth).
// - `habitat.rs`:    Habitat, one cell with its fodder, neighbors and populations.
// - `animal.rs`:     Animal, the individual life-cycle and feeding rules.
// - `config.rs`:     SimConfig, SpeciesParams and LandscapeParams plus partial updates.
// - `population.rs`: Population-insertion records (JSON `loc`/`pop` format).
// - `stats.rs`:      Histograms of age, weight and fitness for plotting frontends.
// - `error.rs`:      Typed errors for layouts, configs and insertions.
// - `prng`:          Re-exported from `biosim_prng`, xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:      Coord, Species and Landscape.
//
// **Critical constraint: determinism.** A run is a pure function of layout,
// seed, config and the sequence of calls. All randomness comes from one
// seeded xoshiro256++ stream owned by `SimState`. No `HashMap`, no system
// time, no OS entropy. Use `BTreeMap` for ordered collections.

pub mod animal;
pub mod config;
pub mod error;
pub mod habitat;
pub mod population;
pub use biosim_prng as prng;
pub mod sim;
pub mod stats;
pub mod types;
pub mod world;
