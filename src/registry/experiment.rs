//! Experiment and Variant - the static catalog entries

use serde::{Deserialize, Serialize};

/// One labeled option within an experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    id: String,
    #[serde(default)]
    name: String,
    weight: f64,
}

impl Variant {
    /// Create a variant with the given id, display name and traffic weight.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
        }
    }

    /// Get the variant ID (the assignment result and conversion join key).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the display name. Falls back to the id when no name was given.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Get the traffic weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }
}

/// Experiment represents a named set of mutually exclusive variants.
///
/// Variant order is part of the bucketing contract: the cumulative-weight walk
/// visits variants in declared order, so reordering them moves users between
/// buckets even when the weights are unchanged.
///
/// An `Experiment` on its own is unchecked. Invariants are enforced when it is
/// added to an [`ExperimentRegistry`](super::ExperimentRegistry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    id: String,
    #[serde(default)]
    name: String,
    variants: Vec<Variant>,
}

impl Experiment {
    /// Create an experiment from an ordered variant list.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique key within the registry
    /// * `name` - Human-readable label
    /// * `variants` - Variants in bucketing order
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variants,
        }
    }

    /// Create a builder that appends variants one by one.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(id, name)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the display name. Falls back to the id when no name was given.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Get the variants in declared order.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Sum of all variant weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.variants.iter().map(|v| v.weight).sum()
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: String,
    name: String,
    variants: Vec<Variant>,
}

impl ExperimentBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// Append a variant. Call order is bucketing order.
    #[must_use]
    pub fn variant(mut self, id: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        self.variants.push(Variant::new(id, name, weight));
        self
    }

    /// Build the `Experiment`.
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            id: self.id,
            name: self.name,
            variants: self.variants,
        }
    }
}
