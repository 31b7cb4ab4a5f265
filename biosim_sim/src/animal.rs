// Individual animals and their life-cycle rules.
//
// Herbivores and carnivores share one `Animal` type tagged with a `Species`.
// Everything species-specific is data: every rule takes the species'
// `SpeciesParams` by reference at call time (see `config.rs`), so parameter
// updates reach animals that already exist. The only behavioral split is
// feeding: herbivores graze fodder (`eat_fodder`), carnivores hunt a
// fitness-sorted prey slice (`hunt`).
//
// Fitness is derived state. It is recomputed after every change to age or
// weight, and is the product of two sigmoids:
//
//   q_age    = 1 / (1 + exp( phi_age    * (age    - a_half)))
//   q_weight = 1 / (1 + exp(-phi_weight * (weight - w_half)))
//
// An animal whose weight drops to zero or below is marked dead on the spot
// and its fitness is left at the last computed value. Dead animals stay in
// their habitat's list until the end-of-year filter in `habitat.rs`.
//
// See also: `habitat.rs`, which runs these rules in the annual phase order.
//
// **Critical constraint: determinism.** Every random decision here draws from
// the caller's `SimRng`, and the number of draws per call is fixed by the
// branch taken. Short-circuited conditions (dead-by-weight in `maybe_die`,
// certain kills in `hunt`) consume no draw. Do not reorder the checks.

use crate::config::SpeciesParams;
use crate::prng::SimRng;
use crate::types::Species;

/// One animal on the island.
#[derive(Clone, Debug, PartialEq)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    alive: bool,
    /// False for newborns and for parents that already gave birth this year.
    can_reproduce: bool,
    /// Set by `decide_migration`, cleared only by a successful move.
    wants_to_migrate: bool,
}

impl Animal {
    /// Create an animal with a known age and weight.
    pub fn with_weight(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        let mut animal = Self {
            species,
            age,
            weight,
            fitness: 0.0,
            alive: true,
            can_reproduce: age > 0,
            wants_to_migrate: false,
        };
        animal.update_fitness(params);
        animal
    }

    /// Create a newborn (age 0) with a weight drawn from the species'
    /// log-normal birth-weight distribution.
    pub fn newborn(species: Species, params: &SpeciesParams, rng: &mut SimRng) -> Self {
        let (mu, sigma) = params.birth_weight_lognormal();
        let weight = rng.lognormal(mu, sigma);
        Self::with_weight(species, 0, weight, params)
    }

    /// Create an animal of the given age. A missing weight is sampled from
    /// the birth-weight distribution.
    pub fn new(
        species: Species,
        age: u32,
        weight: Option<f64>,
        params: &SpeciesParams,
        rng: &mut SimRng,
    ) -> Self {
        match weight {
            Some(weight) => Self::with_weight(species, age, weight, params),
            None => {
                let (mu, sigma) = params.birth_weight_lognormal();
                Self::with_weight(species, age, rng.lognormal(mu, sigma), params)
            }
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn can_reproduce(&self) -> bool {
        self.can_reproduce
    }

    pub fn wants_to_migrate(&self) -> bool {
        self.wants_to_migrate
    }

    /// Recompute fitness from age and weight, or mark the animal dead if its
    /// weight is no longer positive.
    ///
    /// Panics if the result leaves [0, 1]; that can only happen through a
    /// formula or parameter defect.
    pub fn update_fitness(&mut self, params: &SpeciesParams) {
        if self.weight <= 0.0 {
            self.alive = false;
            return;
        }
        let q_age = 1.0 / (1.0 + (params.phi_age * (self.age as f64 - params.a_half)).exp());
        let q_weight = 1.0 / (1.0 + (-params.phi_weight * (self.weight - params.w_half)).exp());
        let fitness = q_age * q_weight;
        assert!(
            (0.0..=1.0).contains(&fitness),
            "{} fitness {fitness} outside [0, 1] (age {}, weight {})",
            self.species,
            self.age,
            self.weight
        );
        self.fitness = fitness;
    }

    /// Attempt to give birth.
    ///
    /// `population` is the number of same-species animals in the habitat at
    /// the start of the reproduction pass. Birth succeeds with probability
    /// `min(1, gamma * fitness * population)`. When the parent can afford the
    /// weight cost `xi * newborn.weight` it pays it and is barred from giving
    /// birth again this year; when it cannot, the newborn is still returned
    /// and the parent keeps its weight and eligibility.
    pub fn reproduce(
        &mut self,
        params: &SpeciesParams,
        population: usize,
        rng: &mut SimRng,
    ) -> Option<Animal> {
        self.update_fitness(params);
        if !self.alive || !self.can_reproduce || self.weight < params.reproduction_threshold() {
            return None;
        }
        let p = (params.gamma * self.fitness * population as f64).min(1.0);
        if rng.next_f64() >= p {
            return None;
        }
        let newborn = Animal::newborn(self.species, params, rng);
        let cost = params.xi * newborn.weight;
        if self.weight - cost > 0.0 {
            self.weight -= cost;
            self.can_reproduce = false;
            self.update_fitness(params);
        }
        Some(newborn)
    }

    /// Roll for migration intent with probability `mu * fitness`.
    pub fn decide_migration(&mut self, params: &SpeciesParams, rng: &mut SimRng) {
        if rng.next_f64() <= params.mu * self.fitness {
            self.wants_to_migrate = true;
        }
    }

    pub(crate) fn finish_migration(&mut self) {
        self.wants_to_migrate = false;
    }

    pub fn age_one_year(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.update_fitness(params);
    }

    pub fn lose_weight(&mut self, params: &SpeciesParams) {
        self.weight *= 1.0 - params.eta;
        self.update_fitness(params);
    }

    /// Die if starved, or with probability `omega * (1 - fitness)`.
    pub fn maybe_die(&mut self, params: &SpeciesParams, rng: &mut SimRng) {
        if self.weight <= 0.0 || rng.next_f64() <= params.omega * (1.0 - self.fitness) {
            self.alive = false;
        }
    }

    /// Allow reproduction again; run on survivors at the end of the year.
    pub fn reset_reproduction(&mut self) {
        self.can_reproduce = true;
    }

    /// Herbivore feeding: eat up to `F` from the available fodder and return
    /// what is left.
    pub fn eat_fodder(&mut self, params: &SpeciesParams, fodder: f64) -> f64 {
        debug_assert_eq!(self.species, Species::Herbivore);
        if fodder <= 0.0 {
            return fodder;
        }
        let eaten = params.f.min(fodder);
        self.weight += params.beta * eaten;
        self.update_fitness(params);
        fodder - eaten
    }

    /// Carnivore feeding: hunt through `prey`, which must be sorted by
    /// ascending fitness.
    ///
    /// Dead prey are skipped. The hunt ends once appetite is spent or the
    /// next prey is at least as fit as the hunter, since every later prey is
    /// fitter still. A kill is certain when the fitness gap exceeds
    /// `DeltaPhiMax`, otherwise it succeeds with probability
    /// `gap / DeltaPhiMax`. Each kill feeds `min(appetite, prey weight)`.
    pub fn hunt(&mut self, params: &SpeciesParams, prey: &mut [Animal], rng: &mut SimRng) {
        debug_assert_eq!(self.species, Species::Carnivore);
        self.update_fitness(params);
        let mut appetite = params.f;
        for target in prey.iter_mut() {
            if !target.alive {
                continue;
            }
            if appetite <= 0.0 || self.fitness <= target.fitness {
                return;
            }
            let gap = self.fitness - target.fitness;
            if gap > params.delta_phi_max || rng.next_f64() <= gap / params.delta_phi_max {
                target.alive = false;
                let eaten = appetite.min(target.weight);
                appetite -= eaten;
                self.weight += params.beta * eaten;
                self.update_fitness(params);
            }
        }
    }
}
