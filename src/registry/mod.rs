//! Experiment Registry - the validated, immutable experiment catalog
//!
//! The registry is built once at startup, either through
//! [`ExperimentRegistry::builder`] or from JSON, and is read-only afterwards.
//! Every invariant is checked at construction so a bad config fails the
//! deploy instead of the page.
//!
//! ## Config Format
//!
//! ```text
//! {
//!   "heroCTA": {
//!     "name": "Hero call to action",
//!     "variants": [
//!       { "id": "control",   "name": "Control",   "weight": 0.34 },
//!       { "id": "variant-a", "name": "Variant A", "weight": 0.33 },
//!       { "id": "variant-b", "name": "Variant B", "weight": 0.33 }
//!     ]
//!   }
//! }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use variant_bucketing::registry::{Experiment, ExperimentRegistry};
//!
//! let registry = ExperimentRegistry::builder()
//!     .experiment(
//!         Experiment::builder("heroCTA", "Hero CTA")
//!             .variant("control", "Control", 0.5)
//!             .variant("variant-a", "Variant A", 0.5)
//!             .build(),
//!     )
//!     .build()?;
//!
//! assert!(registry.get_experiment("heroCTA").is_ok());
//! # Ok::<(), variant_bucketing::Error>(())
//! ```

mod experiment;

pub use experiment::{Experiment, ExperimentBuilder, Variant};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

/// Allowed distance between an experiment's weight sum and 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Read-only catalog of validated experiments.
///
/// `Send + Sync` with no interior mutability, so one instance can be shared
/// behind an `Arc` by any number of concurrent requests.
#[derive(Debug, Default)]
pub struct ExperimentRegistry {
    experiments: HashMap<String, Experiment>,
}

impl ExperimentRegistry {
    /// Create a builder for the registry.
    #[must_use]
    pub fn builder() -> ExperimentRegistryBuilder {
        ExperimentRegistryBuilder::default()
    }

    /// Load a registry from a JSON object mapping experiment id to
    /// `{ name, variants: [{ id, name, weight }] }`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` on malformed input, `Error::DuplicateExperiment`
    /// when an experiment id appears twice in the object, and
    /// `Error::InvalidExperiment` when any experiment violates a registry
    /// invariant. Errors follow the order entries are written in.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let ConfigEntries(entries) = serde_json::from_str(json)?;

        let mut builder = Self::builder();
        for (id, config) in entries {
            builder = builder.experiment(Experiment::new(id, config.name, config.variants));
        }
        builder.build()
    }

    /// Load a registry from a JSON file. See [`Self::from_json_str`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, otherwise the same
    /// errors as [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Get an experiment by ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExperimentNotFound` when the id is absent. Rendering
    /// callers should degrade to [`crate::DEFAULT_VARIANT`] instead of
    /// propagating this.
    pub fn get_experiment(&self, experiment_id: &str) -> Result<&Experiment> {
        self.experiments
            .get(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))
    }

    /// Check whether an experiment is registered.
    #[must_use]
    pub fn contains(&self, experiment_id: &str) -> bool {
        self.experiments.contains_key(experiment_id)
    }

    /// Iterate over all experiments (unordered).
    pub fn experiments(&self) -> impl Iterator<Item = &Experiment> {
        self.experiments.values()
    }

    /// Get the number of experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Check if the registry has no experiments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

#[derive(Deserialize)]
struct ExperimentConfig {
    #[serde(default)]
    name: String,
    variants: Vec<Variant>,
}

/// Top-level config object read entry by entry, keeping repeated keys so the
/// builder can reject them.
struct ConfigEntries(Vec<(String, ExperimentConfig)>);

impl<'de> Deserialize<'de> for ConfigEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ConfigEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of experiment id to experiment config")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, ExperimentConfig>()? {
                    entries.push(entry);
                }
                Ok(ConfigEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Builder for `ExperimentRegistry`.
#[derive(Debug, Default)]
pub struct ExperimentRegistryBuilder {
    experiments: Vec<Experiment>,
}

impl ExperimentRegistryBuilder {
    /// Add an experiment. Validation is deferred to [`Self::build`].
    #[must_use]
    pub fn experiment(mut self, experiment: Experiment) -> Self {
        self.experiments.push(experiment);
        self
    }

    /// Validate every experiment and build the registry.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidExperiment` for an empty variant list, a zero,
    /// negative or non-finite weight, a duplicate variant id, or a weight sum
    /// further than [`WEIGHT_TOLERANCE`] from 1.0. Returns
    /// `Error::DuplicateExperiment` when an id is registered twice.
    pub fn build(self) -> Result<ExperimentRegistry> {
        let mut experiments = HashMap::with_capacity(self.experiments.len());

        for experiment in self.experiments {
            validate(&experiment)?;
            let id = experiment.id().to_string();
            if experiments.contains_key(&id) {
                return Err(Error::DuplicateExperiment(id));
            }
            experiments.insert(id, experiment);
        }

        tracing::info!(experiments = experiments.len(), "experiment registry loaded");
        Ok(ExperimentRegistry { experiments })
    }
}

fn validate(experiment: &Experiment) -> Result<()> {
    let id = experiment.id();
    if id.is_empty() {
        return Err(Error::invalid(id, "experiment id must not be empty"));
    }
    if experiment.variants().is_empty() {
        return Err(Error::invalid(id, "variant list is empty"));
    }

    let mut seen = HashSet::with_capacity(experiment.variants().len());
    for variant in experiment.variants() {
        let weight = variant.weight();
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::invalid(
                id,
                format!("variant '{}' has invalid weight {weight}", variant.id()),
            ));
        }
        if !seen.insert(variant.id()) {
            return Err(Error::invalid(
                id,
                format!("duplicate variant id '{}'", variant.id()),
            ));
        }
    }

    let total = experiment.total_weight();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(Error::invalid(
            id,
            format!("variant weights sum to {total}, expected 1.0"),
        ));
    }

    Ok(())
}
