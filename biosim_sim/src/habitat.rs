// A single island cell and the per-cell annual phases.
//
// A `Habitat` owns the herbivores and carnivores currently living on its
// cell, the fodder left this year, and the coordinates of its four cardinal
// neighbors (resolved once when the island is built, see `world.rs`).
// Neighbors are stored as coordinates, not references; `SimState` resolves
// them to habitats when it runs the migration exchange.
//
// The phases below are called by `SimState::advance_year` in a fixed order:
//
//   reproduction -> feeding -> migration intent        (every habitable cell)
//   [migration exchange, owned by sim.rs]
//   aging -> weight loss -> death -> eligibility reset (every habitable cell)
//
// Within a phase herbivores are processed before carnivores, each in list
// order. Water cells never hold animals, so their phases are no-ops and the
// sim skips them outright.
//
// **Critical constraint: determinism.** The list order at the start of each
// phase decides the order of random draws. Newborns are appended only after
// the whole reproduction pass, feeding shuffles herbivores before grazing and
// then sorts both lists (stable sorts) before hunting.

use crate::animal::Animal;
use crate::config::SimConfig;
use crate::population::AnimalEntry;
use crate::prng::SimRng;
use crate::types::{Coord, Landscape, Species};

/// One cell of the island.
#[derive(Clone, Debug)]
pub struct Habitat {
    coord: Coord,
    landscape: Landscape,
    /// Fodder left for the current year.
    fodder: f64,
    /// Cardinal neighbors in migration draw order: west, east, south, north.
    /// `None` only for water cells on the map edge.
    neighbors: [Option<Coord>; 4],
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Habitat {
    pub fn new(coord: Coord, landscape: Landscape, neighbors: [Option<Coord>; 4], fodder: f64) -> Self {
        Self {
            coord,
            landscape,
            fodder,
            neighbors,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn landscape(&self) -> Landscape {
        self.landscape
    }

    pub fn accepts_animals(&self) -> bool {
        self.landscape.accepts_animals()
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn neighbors(&self) -> &[Option<Coord>; 4] {
        &self.neighbors
    }

    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }

    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub(crate) fn animals_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    /// `(herbivores, carnivores)` currently listed here, dead prey included
    /// until the death phase has run.
    pub fn count(&self) -> (usize, usize) {
        (self.herbivores.len(), self.carnivores.len())
    }

    /// Replace the species' population with animals built from `entries`.
    ///
    /// This discards whatever animals of that species lived here before;
    /// calling it twice keeps only the second batch.
    pub fn add_population(
        &mut self,
        species: Species,
        entries: &[AnimalEntry],
        config: &SimConfig,
        rng: &mut SimRng,
    ) {
        let params = config.species(species);
        *self.animals_mut(species) = entries
            .iter()
            .map(|e| Animal::new(species, e.age, e.weight, params, rng))
            .collect();
    }

    /// Every resident attempts to give birth. Returns the number of births.
    pub fn run_reproduction_phase(&mut self, config: &SimConfig, rng: &mut SimRng) -> usize {
        let mut births = 0;
        for species in Species::ALL {
            births += reproduce_all(self.animals_mut(species), config, species, rng);
        }
        births
    }

    /// Reset the fodder, let herbivores graze in random order, then let
    /// carnivores hunt from fittest to least fit against the prey list
    /// sorted from least fit up.
    pub fn run_feeding_phase(&mut self, config: &SimConfig, rng: &mut SimRng) {
        self.fodder = config.fodder(self.landscape);

        rng.shuffle(&mut self.herbivores);
        let herb_params = config.species(Species::Herbivore);
        for herb in &mut self.herbivores {
            self.fodder = herb.eat_fodder(herb_params, self.fodder);
        }

        self.herbivores
            .sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        self.carnivores
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        let carn_params = config.species(Species::Carnivore);
        for carn in &mut self.carnivores {
            carn.hunt(carn_params, &mut self.herbivores, rng);
        }
    }

    pub fn run_migration_intent_phase(&mut self, config: &SimConfig, rng: &mut SimRng) {
        for species in Species::ALL {
            let params = config.species(species);
            for animal in self.animals_mut(species) {
                animal.decide_migration(params, rng);
            }
        }
    }

    pub fn run_aging_phase(&mut self, config: &SimConfig) {
        for species in Species::ALL {
            let params = config.species(species);
            for animal in self.animals_mut(species) {
                animal.age_one_year(params);
            }
        }
    }

    pub fn run_weight_loss_phase(&mut self, config: &SimConfig) {
        for species in Species::ALL {
            let params = config.species(species);
            for animal in self.animals_mut(species) {
                animal.lose_weight(params);
            }
        }
    }

    /// Roll for death and drop every dead animal for good. Returns the
    /// number removed, including prey killed earlier in the year.
    pub fn run_death_phase(&mut self, config: &SimConfig, rng: &mut SimRng) -> usize {
        let mut removed = 0;
        for species in Species::ALL {
            let params = config.species(species);
            let animals = self.animals_mut(species);
            for animal in animals.iter_mut() {
                animal.maybe_die(params, rng);
            }
            let before = animals.len();
            animals.retain(Animal::is_alive);
            removed += before - animals.len();
        }
        removed
    }

    pub fn reset_reproductive_eligibility(&mut self) {
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.reset_reproduction();
        }
    }
}

/// Run one reproduction pass over `animals`. Every parent sees the headcount
/// from before the pass, and newborns join the list only afterwards.
fn reproduce_all(
    animals: &mut Vec<Animal>,
    config: &SimConfig,
    species: Species,
    rng: &mut SimRng,
) -> usize {
    let params = config.species(species);
    let population = animals.len();
    let newborns: Vec<Animal> = animals
        .iter_mut()
        .filter_map(|parent| parent.reproduce(params, population, rng))
        .collect();
    let births = newborns.len();
    animals.extend(newborns);
    births
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamUpdate;

    fn lowland() -> Habitat {
        Habitat::new(Coord::new(2, 2), Landscape::Lowland, [None; 4], 0.0)
    }

    fn entries(pairs: &[(u32, f64)]) -> Vec<AnimalEntry> {
        pairs
            .iter()
            .map(|&(age, weight)| AnimalEntry {
                age,
                weight: Some(weight),
            })
            .collect()
    }

    fn set(config: &mut SimConfig, species: Species, name: &str, value: f64) {
        let update: ParamUpdate = [(name.to_string(), value)].into_iter().collect();
        config.update_species(species, Some(&update)).unwrap();
    }

    #[test]
    fn add_population_replaces_existing_animals() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(1);
        let mut cell = lowland();
        cell.add_population(Species::Herbivore, &entries(&[(5, 20.0); 3]), &config, &mut rng);
        cell.add_population(Species::Herbivore, &entries(&[(7, 11.0); 2]), &config, &mut rng);
        assert_eq!(cell.count(), (2, 0));
        assert!(cell.herbivores().iter().all(|h| h.age() == 7 && h.weight() == 11.0));
    }

    #[test]
    fn newborns_join_after_the_pass() {
        let mut config = SimConfig::default();
        set(&mut config, Species::Herbivore, "gamma", 1e6);
        let mut rng = SimRng::new(2);
        let mut cell = lowland();
        cell.add_population(Species::Herbivore, &entries(&[(5, 60.0); 4]), &config, &mut rng);
        let births = cell.run_reproduction_phase(&config, &mut rng);
        // Every adult gives birth once; newborns do not breed in the same pass.
        assert_eq!(births, 4);
        assert_eq!(cell.count(), (8, 0));
        assert_eq!(cell.herbivores().iter().filter(|h| h.age() == 0).count(), 4);
    }

    #[test]
    fn lone_carnivore_breeds_with_probability_gamma_times_fitness() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(3);
        let mut cell = lowland();
        // Fitness is close to 1, so each trial breeds with probability ~0.8.
        cell.add_population(Species::Carnivore, &entries(&[(5, 40.0)]), &config, &mut rng);
        let mut births = 0;
        for _ in 0..200 {
            let mut trial = cell.clone();
            births += trial.run_reproduction_phase(&config, &mut rng);
        }
        assert!(births > 100 && births < 200, "births {births}");
    }

    #[test]
    fn feeding_depletes_fodder_and_sorts_lists() {
        let mut config = SimConfig::default();
        config
            .update_landscape(
                Landscape::Lowland,
                Some(&[("Fodder".to_string(), 15.0)].into_iter().collect()),
            )
            .unwrap();
        let mut rng = SimRng::new(4);
        let mut cell = lowland();
        cell.add_population(
            Species::Herbivore,
            &entries(&[(5, 20.0), (30, 12.0), (2, 40.0)]),
            &config,
            &mut rng,
        );
        cell.add_population(
            Species::Carnivore,
            &entries(&[(50, 3.0), (4, 35.0)]),
            &config,
            &mut rng,
        );
        let herb_weight_before: f64 = cell.herbivores().iter().map(Animal::weight).sum();
        cell.run_feeding_phase(&config, &mut rng);

        assert_eq!(cell.fodder(), 0.0);
        let fit: Vec<f64> = cell.herbivores().iter().map(Animal::fitness).collect();
        assert!(fit.windows(2).all(|w| w[0] <= w[1]));
        let fit: Vec<f64> = cell.carnivores().iter().map(Animal::fitness).collect();
        assert!(fit.windows(2).all(|w| w[0] >= w[1]));
        let herb_weight_after: f64 = cell.herbivores().iter().map(Animal::weight).sum();
        let beta = config.herbivore.beta;
        assert!((herb_weight_after - herb_weight_before - beta * 15.0).abs() < 1e-9);
    }

    #[test]
    fn feeding_resets_fodder_every_year() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut cell = lowland();
        cell.add_population(Species::Herbivore, &entries(&[(5, 20.0)]), &config, &mut rng);
        cell.run_feeding_phase(&config, &mut rng);
        assert_eq!(cell.fodder(), 800.0 - config.herbivore.f);
        cell.run_feeding_phase(&config, &mut rng);
        assert_eq!(cell.fodder(), 800.0 - config.herbivore.f);
    }

    #[test]
    fn death_phase_filters_and_counts() {
        let mut config = SimConfig::default();
        set(&mut config, Species::Herbivore, "omega", 1e6);
        set(&mut config, Species::Carnivore, "omega", 0.0);
        let mut rng = SimRng::new(6);
        let mut cell = lowland();
        cell.add_population(Species::Herbivore, &entries(&[(5, 20.0); 5]), &config, &mut rng);
        cell.add_population(Species::Carnivore, &entries(&[(5, 20.0); 2]), &config, &mut rng);
        let removed = cell.run_death_phase(&config, &mut rng);
        assert_eq!(removed, 5);
        assert_eq!(cell.count(), (0, 2));
    }

    #[test]
    fn aging_and_weight_loss_touch_every_resident() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(7);
        let mut cell = lowland();
        cell.add_population(Species::Herbivore, &entries(&[(1, 20.0); 2]), &config, &mut rng);
        cell.add_population(Species::Carnivore, &entries(&[(3, 16.0)]), &config, &mut rng);
        cell.run_aging_phase(&config);
        cell.run_weight_loss_phase(&config);
        assert!(cell.herbivores().iter().all(|h| h.age() == 2));
        assert!(
            cell.herbivores()
                .iter()
                .all(|h| h.weight() == 20.0 * (1.0 - config.herbivore.eta))
        );
        assert_eq!(cell.carnivores()[0].age(), 4);
        assert_eq!(cell.carnivores()[0].weight(), 16.0 * (1.0 - config.carnivore.eta));
    }

    #[test]
    fn eligibility_reset_reenables_parents_and_newborns() {
        let mut config = SimConfig::default();
        set(&mut config, Species::Carnivore, "gamma", 1e6);
        let mut rng = SimRng::new(8);
        let mut cell = lowland();
        cell.add_population(Species::Carnivore, &entries(&[(5, 50.0); 2]), &config, &mut rng);
        cell.run_reproduction_phase(&config, &mut rng);
        assert!(cell.carnivores().iter().all(|c| !c.can_reproduce()));
        cell.reset_reproductive_eligibility();
        assert!(cell.carnivores().iter().all(Animal::can_reproduce));
    }

    #[test]
    fn migration_intent_rolls_for_everyone() {
        let mut config = SimConfig::default();
        set(&mut config, Species::Herbivore, "mu", 1e6);
        set(&mut config, Species::Carnivore, "mu", 1e6);
        let mut rng = SimRng::new(9);
        let mut cell = lowland();
        cell.add_population(Species::Herbivore, &entries(&[(5, 20.0); 3]), &config, &mut rng);
        cell.add_population(Species::Carnivore, &entries(&[(5, 20.0); 3]), &config, &mut rng);
        cell.run_migration_intent_phase(&config, &mut rng);
        assert!(cell.herbivores().iter().all(Animal::wants_to_migrate));
        assert!(cell.carnivores().iter().all(Animal::wants_to_migrate));
    }
}
