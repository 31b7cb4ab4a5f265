// Data-driven simulation configuration.
//
// All tunable model parameters live in `SimConfig`: one `SpeciesParams` per
// species and one `LandscapeParams` per landscape kind. The sim never uses
// magic numbers, it reads from the config owned by `SimState`. Parameters are
// looked up by kind at the moment they are used, so an update applies to
// every existing animal and habitat of that kind from the next phase on.
//
// Updates arrive as partial name -> value maps (`ParamUpdate`) using the
// model's parameter names (`w_birth`, `F`, `DeltaPhiMax`, `Fodder`, ...).
// Each update is validated in full before anything is written; an update
// without payload is reported back as `UpdateOutcome::NoPayload`.
//
// See also: `animal.rs` and `habitat.rs`, which read these values, and
// `sim.rs` for `SimState::set_species_params` / `set_landscape_params`.
//
// **Critical constraint: determinism.** Config values feed directly into the
// stochastic rules. Two runs only reproduce each other when both the seed and
// the config match.

use crate::error::ConfigError;
use crate::types::{Landscape, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A partial parameter mapping, merged key by key into a parameter set.
pub type ParamUpdate = BTreeMap<String, f64>;

/// What an update call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The listed parameters were overwritten.
    Updated(Vec<String>),
    /// No payload was supplied; nothing changed.
    NoPayload,
}

// ---------------------------------------------------------------------------
// Species parameters
// ---------------------------------------------------------------------------

/// Life-cycle parameters shared by every animal of one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean birth weight.
    pub w_birth: f64,
    /// Standard deviation of the birth weight.
    pub sigma_birth: f64,
    /// Fraction of eaten food converted to body weight.
    pub beta: f64,
    /// Fraction of body weight lost each year.
    pub eta: f64,
    /// Age at which the age sigmoid is one half.
    pub a_half: f64,
    /// Steepness of the age sigmoid.
    pub phi_age: f64,
    /// Weight at which the weight sigmoid is one half.
    pub w_half: f64,
    /// Steepness of the weight sigmoid.
    pub phi_weight: f64,
    /// Migration propensity, scaled by fitness.
    pub mu: f64,
    /// Birth probability factor, scaled by fitness and same-species headcount.
    pub gamma: f64,
    /// Minimum weight for reproduction, in units of `w_birth + sigma_birth`.
    pub zeta: f64,
    /// Weight a parent loses per unit of newborn weight.
    pub xi: f64,
    /// Death probability factor, scaled by `1 - fitness`.
    pub omega: f64,
    /// Appetite: food wanted per year.
    #[serde(rename = "F")]
    pub f: f64,
    /// Fitness gap at which a kill becomes certain. Read only for carnivores.
    #[serde(rename = "DeltaPhiMax", default = "default_delta_phi_max")]
    pub delta_phi_max: f64,
}

fn default_delta_phi_max() -> f64 {
    10.0
}

const SHARED_PARAM_NAMES: [&str; 14] = [
    "w_birth",
    "sigma_birth",
    "beta",
    "eta",
    "a_half",
    "phi_age",
    "w_half",
    "phi_weight",
    "mu",
    "gamma",
    "zeta",
    "xi",
    "omega",
    "F",
];

impl SpeciesParams {
    /// Reference herbivore parameters.
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: default_delta_phi_max(),
        }
    }

    /// Reference carnivore parameters.
    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: 50.0,
            delta_phi_max: default_delta_phi_max(),
        }
    }

    /// Parameters of the log-normal birth-weight distribution, moment-matched
    /// so the sampled weights have mean `w_birth` and spread `sigma_birth`.
    ///
    /// Returns `(mu, sigma)` of the underlying normal.
    pub fn birth_weight_lognormal(&self) -> (f64, f64) {
        let w2 = self.w_birth * self.w_birth;
        let s2 = self.sigma_birth * self.sigma_birth;
        let mu = (w2 / (w2 + s2).sqrt()).ln();
        let sigma = (1.0 + s2 / w2).ln().sqrt();
        (mu, sigma)
    }

    /// Minimum weight an animal needs before it may give birth.
    pub fn reproduction_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }

    /// Names accepted by `apply_update` for the given species.
    pub fn param_names(species: Species) -> Vec<&'static str> {
        let mut names = SHARED_PARAM_NAMES.to_vec();
        if species == Species::Carnivore {
            names.push("DeltaPhiMax");
        }
        names
    }

    /// Current value of a named parameter, or `None` if the species has no
    /// parameter of that name.
    pub fn field(&self, species: Species, name: &str) -> Option<f64> {
        let value = match name {
            "w_birth" => self.w_birth,
            "sigma_birth" => self.sigma_birth,
            "beta" => self.beta,
            "eta" => self.eta,
            "a_half" => self.a_half,
            "phi_age" => self.phi_age,
            "w_half" => self.w_half,
            "phi_weight" => self.phi_weight,
            "mu" => self.mu,
            "gamma" => self.gamma,
            "zeta" => self.zeta,
            "xi" => self.xi,
            "omega" => self.omega,
            "F" => self.f,
            "DeltaPhiMax" if species == Species::Carnivore => self.delta_phi_max,
            _ => return None,
        };
        Some(value)
    }

    fn field_mut(&mut self, species: Species, name: &str) -> Option<&mut f64> {
        let field = match name {
            "w_birth" => &mut self.w_birth,
            "sigma_birth" => &mut self.sigma_birth,
            "beta" => &mut self.beta,
            "eta" => &mut self.eta,
            "a_half" => &mut self.a_half,
            "phi_age" => &mut self.phi_age,
            "w_half" => &mut self.w_half,
            "phi_weight" => &mut self.phi_weight,
            "mu" => &mut self.mu,
            "gamma" => &mut self.gamma,
            "zeta" => &mut self.zeta,
            "xi" => &mut self.xi,
            "omega" => &mut self.omega,
            "F" => &mut self.f,
            "DeltaPhiMax" if species == Species::Carnivore => &mut self.delta_phi_max,
            _ => return None,
        };
        Some(field)
    }

    /// Merge `update` into this parameter set. All-or-nothing: on error the
    /// set is left untouched.
    pub fn apply_update(
        &mut self,
        species: Species,
        update: &ParamUpdate,
    ) -> Result<Vec<String>, ConfigError> {
        let mut next = self.clone();
        for (name, &value) in update {
            let slot = next
                .field_mut(species, name)
                .ok_or_else(|| ConfigError::UnknownParameter {
                    target: species.to_string(),
                    name: name.clone(),
                })?;
            check_species_value(species, name, value)?;
            *slot = value;
        }
        *self = next;
        Ok(update.keys().cloned().collect())
    }

    /// Check every value of this set against the validation rules.
    pub fn validate(&self, species: Species) -> Result<(), ConfigError> {
        for name in Self::param_names(species) {
            if let Some(value) = self.field(species, name) {
                check_species_value(species, name, value)?;
            }
        }
        Ok(())
    }
}

fn check_species_value(species: Species, name: &str, value: f64) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidValue {
        target: species.to_string(),
        name: name.to_string(),
        value,
        reason,
    };
    if !value.is_finite() {
        return Err(invalid("must be finite"));
    }
    match name {
        "a_half" | "phi_age" | "w_half" | "phi_weight" => Ok(()),
        "w_birth" | "DeltaPhiMax" if value <= 0.0 => Err(invalid("must be positive")),
        "eta" if !(0.0..=1.0).contains(&value) => Err(invalid("must lie in [0, 1]")),
        _ if value < 0.0 => Err(invalid("must not be negative")),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Landscape parameters
// ---------------------------------------------------------------------------

/// Parameters shared by every cell of one landscape kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandscapeParams {
    /// Fodder available to herbivores at the start of each feeding phase.
    #[serde(rename = "Fodder", alias = "f_max")]
    pub fodder: f64,
}

impl LandscapeParams {
    pub fn new(fodder: f64) -> Self {
        Self { fodder }
    }

    /// Merge `update` into this parameter set. All-or-nothing.
    pub fn apply_update(
        &mut self,
        kind: Landscape,
        update: &ParamUpdate,
    ) -> Result<Vec<String>, ConfigError> {
        let mut next = self.clone();
        for (name, &value) in update {
            match name.as_str() {
                "Fodder" | "f_max" => {
                    check_landscape_value(kind, name, value)?;
                    next.fodder = value;
                }
                _ => {
                    return Err(ConfigError::UnknownParameter {
                        target: landscape_target(kind),
                        name: name.clone(),
                    });
                }
            }
        }
        *self = next;
        Ok(update.keys().cloned().collect())
    }
}

fn landscape_target(kind: Landscape) -> String {
    format!("landscape '{}'", kind.symbol())
}

fn check_landscape_value(kind: Landscape, name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            target: landscape_target(kind),
            name: name.to_string(),
            value,
            reason: "must be finite and not negative",
        })
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    /// Per-kind landscape parameters. A kind missing from the map has no
    /// fodder.
    pub landscapes: BTreeMap<Landscape, LandscapeParams>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut landscapes = BTreeMap::new();
        landscapes.insert(Landscape::Water, LandscapeParams::new(0.0));
        landscapes.insert(Landscape::Lowland, LandscapeParams::new(800.0));
        landscapes.insert(Landscape::Highland, LandscapeParams::new(400.0));
        landscapes.insert(Landscape::Desert, LandscapeParams::new(0.0));
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            landscapes,
        }
    }
}

impl SimConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against the validation rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for species in Species::ALL {
            self.species(species).validate(species)?;
        }
        for (&kind, params) in &self.landscapes {
            check_landscape_value(kind, "Fodder", params.fodder)?;
        }
        Ok(())
    }

    /// Parameter set of a species.
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    /// Yearly fodder budget of a landscape kind.
    pub fn fodder(&self, kind: Landscape) -> f64 {
        self.landscapes.get(&kind).map_or(0.0, |p| p.fodder)
    }

    /// Merge a partial update into a species' parameter set.
    pub fn update_species(
        &mut self,
        species: Species,
        update: Option<&ParamUpdate>,
    ) -> Result<UpdateOutcome, ConfigError> {
        match update {
            Some(update) if !update.is_empty() => self
                .species_mut(species)
                .apply_update(species, update)
                .map(UpdateOutcome::Updated),
            _ => Ok(UpdateOutcome::NoPayload),
        }
    }

    /// Merge a partial update into a landscape kind's parameter set.
    pub fn update_landscape(
        &mut self,
        kind: Landscape,
        update: Option<&ParamUpdate>,
    ) -> Result<UpdateOutcome, ConfigError> {
        match update {
            Some(update) if !update.is_empty() => self
                .landscapes
                .entry(kind)
                .or_insert_with(|| LandscapeParams::new(0.0))
                .apply_update(kind, update)
                .map(UpdateOutcome::Updated),
            _ => Ok(UpdateOutcome::NoPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(pairs: &[(&str, f64)]) -> ParamUpdate {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn default_config_serializes() {
        let config = SimConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"F\""));
        assert!(json.contains("\"DeltaPhiMax\""));
        assert!(json.contains("\"Fodder\""));
        let restored = SimConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn config_loads_from_json_string() {
        let json = r#"{
            "herbivore": {
                "w_birth": 8.0, "sigma_birth": 1.5, "beta": 0.9, "eta": 0.05,
                "a_half": 40.0, "phi_age": 0.6, "w_half": 10.0, "phi_weight": 0.1,
                "mu": 0.25, "gamma": 0.2, "zeta": 3.5, "xi": 1.2, "omega": 0.4,
                "F": 12.0
            },
            "carnivore": {
                "w_birth": 6.0, "sigma_birth": 1.0, "beta": 0.75, "eta": 0.125,
                "a_half": 40.0, "phi_age": 0.3, "w_half": 4.0, "phi_weight": 0.4,
                "mu": 0.4, "gamma": 0.8, "zeta": 3.5, "xi": 1.1, "omega": 0.8,
                "F": 50.0, "DeltaPhiMax": 5.0
            },
            "landscapes": {
                "Lowland": { "Fodder": 700.0 },
                "Highland": { "f_max": 300.0 }
            }
        }"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.herbivore.f, 12.0);
        assert_eq!(config.carnivore.delta_phi_max, 5.0);
        assert_eq!(config.fodder(Landscape::Lowland), 700.0);
        assert_eq!(config.fodder(Landscape::Highland), 300.0);
        // Missing kinds carry no fodder.
        assert_eq!(config.fodder(Landscape::Desert), 0.0);
    }

    #[test]
    fn config_rejects_invalid_json_values() {
        let mut config = SimConfig::default();
        config.herbivore.eta = 1.5;
        let json = serde_json::to_string(&config).unwrap();
        assert!(matches!(
            SimConfig::from_json(&json),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn birth_weight_moments_match_formula() {
        let params = SpeciesParams::herbivore();
        let (mu, sigma) = params.birth_weight_lognormal();
        let expected_mu = (64.0f64 / (64.0f64 + 2.25).sqrt()).ln();
        let expected_sigma = (1.0f64 + 2.25 / 64.0).ln().sqrt();
        assert!((mu - expected_mu).abs() < 1e-12);
        assert!((sigma - expected_sigma).abs() < 1e-12);
        // Mean of the log-normal recovers w_birth.
        assert!(((mu + sigma * sigma / 2.0).exp() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn species_update_merges_keys() {
        let mut config = SimConfig::default();
        let outcome = config
            .update_species(Species::Herbivore, Some(&update(&[("beta", 0.5), ("F", 20.0)])))
            .unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::Updated(vec!["F".to_string(), "beta".to_string()])
        );
        assert_eq!(config.herbivore.beta, 0.5);
        assert_eq!(config.herbivore.f, 20.0);
        // Untouched keys keep their values.
        assert_eq!(config.herbivore.eta, 0.05);
        assert_eq!(config.carnivore, SpeciesParams::carnivore());
    }

    #[test]
    fn empty_update_reports_no_payload() {
        let mut config = SimConfig::default();
        assert_eq!(
            config.update_species(Species::Carnivore, None).unwrap(),
            UpdateOutcome::NoPayload
        );
        assert_eq!(
            config
                .update_landscape(Landscape::Lowland, Some(&ParamUpdate::new()))
                .unwrap(),
            UpdateOutcome::NoPayload
        );
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn unknown_parameter_is_rejected_atomically() {
        let mut config = SimConfig::default();
        let err = config
            .update_species(
                Species::Herbivore,
                Some(&update(&[("beta", 0.1), ("wings", 2.0)])),
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownParameter { .. }));
        assert_eq!(config.herbivore.beta, 0.9);
    }

    #[test]
    fn delta_phi_max_is_carnivore_only() {
        let mut config = SimConfig::default();
        assert!(
            config
                .update_species(Species::Herbivore, Some(&update(&[("DeltaPhiMax", 2.0)])))
                .is_err()
        );
        config
            .update_species(Species::Carnivore, Some(&update(&[("DeltaPhiMax", 2.0)])))
            .unwrap();
        assert_eq!(config.carnivore.delta_phi_max, 2.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = SimConfig::default();
        for (name, value) in [
            ("eta", 1.2),
            ("w_birth", 0.0),
            ("gamma", -0.1),
            ("F", f64::NAN),
            ("DeltaPhiMax", 0.0),
        ] {
            let result = config.update_species(Species::Carnivore, Some(&update(&[(name, value)])));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { .. })),
                "{name} = {value} should be rejected"
            );
        }
        assert_eq!(config.carnivore, SpeciesParams::carnivore());
        // Sigmoid shape parameters may be negative.
        config
            .update_species(Species::Carnivore, Some(&update(&[("phi_age", -0.3)])))
            .unwrap();
    }

    #[test]
    fn landscape_update_sets_fodder() {
        let mut config = SimConfig::default();
        config
            .update_landscape(Landscape::Highland, Some(&update(&[("Fodder", 500.0)])))
            .unwrap();
        assert_eq!(config.fodder(Landscape::Highland), 500.0);
        // Older configs spell the budget `f_max`.
        config
            .update_landscape(Landscape::Highland, Some(&update(&[("f_max", 150.0)])))
            .unwrap();
        assert_eq!(config.fodder(Landscape::Highland), 150.0);
        assert!(
            config
                .update_landscape(Landscape::Highland, Some(&update(&[("accepts_animals", 1.0)])))
                .is_err()
        );
        assert!(
            config
                .update_landscape(Landscape::Desert, Some(&update(&[("Fodder", -1.0)])))
                .is_err()
        );
    }

    #[test]
    fn field_reads_named_parameters() {
        let herb = SpeciesParams::herbivore();
        assert_eq!(herb.field(Species::Herbivore, "F"), Some(10.0));
        assert_eq!(herb.field(Species::Herbivore, "eta"), Some(0.05));
        assert_eq!(herb.field(Species::Herbivore, "DeltaPhiMax"), None);
        assert_eq!(herb.field(Species::Herbivore, "bogus"), None);
        let carn = SpeciesParams::carnivore();
        assert_eq!(carn.field(Species::Carnivore, "DeltaPhiMax"), Some(10.0));
        for name in SpeciesParams::param_names(Species::Carnivore) {
            assert!(carn.field(Species::Carnivore, name).is_some(), "{name}");
        }
    }
}
