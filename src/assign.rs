//! Variant assignment - hash-and-cumulative-weight bucketing
//!
//! **Problem**: show a user the same variant on every page load without any
//! server-side session storage.
//!
//! **Solution**: hash `user_id ++ experiment_id` with a 31-multiplier rolling
//! hash, normalize it into `[0, 1]`, and walk the experiment's variants in
//! declared order until the cumulative weight reaches the normalized value.
//!
//! The hash is a traffic-splitting hash, not a security primitive. Both the
//! hash family and [`NORMALIZATION_CONSTANT`] are frozen: changing either one
//! reshuffles every existing user into new buckets.
//!
//! ```rust
//! use std::sync::Arc;
//! use variant_bucketing::assign::VariantAssigner;
//! use variant_bucketing::registry::{Experiment, ExperimentRegistry};
//!
//! let registry = ExperimentRegistry::builder()
//!     .experiment(
//!         Experiment::builder("heroCTA", "Hero CTA")
//!             .variant("control", "Control", 0.34)
//!             .variant("variant-a", "Variant A", 0.33)
//!             .variant("variant-b", "Variant B", 0.33)
//!             .build(),
//!     )
//!     .build()?;
//!
//! let assigner = VariantAssigner::new(Arc::new(registry));
//! let first = assigner.assign("heroCTA", Some("user_42"));
//! assert_eq!(first, assigner.assign("heroCTA", Some("user_42")));
//! assert_eq!(assigner.assign("missingExperiment", Some("user_42")), "control");
//! # Ok::<(), variant_bucketing::Error>(())
//! ```

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::registry::{ExperimentRegistry, Variant};
use crate::DEFAULT_VARIANT;

/// Divisor turning `|hash|` into a fraction: `2^31`, the magnitude of
/// `i32::MIN`. Frozen; see the module docs.
pub const NORMALIZATION_CONSTANT: f64 = 2_147_483_648.0;

/// Rolling hash over the chars of `user_id` followed by `experiment_id`.
///
/// `hash = hash * 31 + codepoint(c)` for each char, wrapping to a signed
/// 32-bit integer. Identical to Java's `String::hashCode` for BMP text.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn bucket_hash(user_id: &str, experiment_id: &str) -> i32 {
    user_id.chars().chain(experiment_id.chars()).fold(0i32, |hash, c| {
        // char as u32 is at most 0x10FFFF, always fits i32
        hash.wrapping_mul(31).wrapping_add(c as i32)
    })
}

/// Map a bucket hash into `[0, 1]`.
///
/// Only `i32::MIN` reaches exactly 1.0; the walk sends it to the last variant.
#[must_use]
pub fn normalize_hash(hash: i32) -> f64 {
    f64::from(hash.unsigned_abs()) / NORMALIZATION_CONSTANT
}

/// Walk `variants` in order and return the first whose cumulative weight is
/// `>= point`.
///
/// Falls back to the last variant when rounding leaves the final cumulative
/// weight just below `point`. Returns `None` only for an empty slice, which a
/// validated registry never contains.
#[must_use]
pub fn select_variant(variants: &[Variant], point: f64) -> Option<&Variant> {
    let mut cumulative = 0.0;
    for variant in variants {
        cumulative += variant.weight();
        if cumulative >= point {
            return Some(variant);
        }
    }
    variants.last()
}

/// Result of one assignment call. Never cached by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    experiment_id: String,
    variant_id: String,
    user_id: Option<String>,
}

impl Assignment {
    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the assigned variant ID.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the user ID the assignment was hashed from, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Whether repeating the call is guaranteed to return the same variant.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        self.user_id.is_some()
    }

    /// Consume the assignment, returning the variant ID.
    #[must_use]
    pub fn into_variant_id(self) -> String {
        self.variant_id
    }
}

/// Maps `(experiment id, optional user id)` to a variant id.
///
/// Pure function of its inputs and the registry, except on the no-user-id
/// path which draws from a random source. Never fails: unknown experiments
/// resolve to [`DEFAULT_VARIANT`].
#[derive(Debug, Clone)]
pub struct VariantAssigner {
    registry: Arc<ExperimentRegistry>,
}

impl VariantAssigner {
    /// Create an assigner over a shared registry.
    #[must_use]
    pub const fn new(registry: Arc<ExperimentRegistry>) -> Self {
        Self { registry }
    }

    /// Get the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ExperimentRegistry {
        &self.registry
    }

    /// Assign a variant id using the thread-local RNG for anonymous calls.
    #[must_use]
    pub fn assign(&self, experiment_id: &str, user_id: Option<&str>) -> String {
        self.assign_with_rng(experiment_id, user_id, &mut rand::thread_rng())
    }

    /// Assign a variant id, drawing from `rng` when no user id is given.
    #[must_use]
    pub fn assign_with_rng<R: Rng>(
        &self,
        experiment_id: &str,
        user_id: Option<&str>,
        rng: &mut R,
    ) -> String {
        self.assignment_with_rng(experiment_id, user_id, rng)
            .into_variant_id()
    }

    /// Assign and return the full [`Assignment`].
    #[must_use]
    pub fn assignment(&self, experiment_id: &str, user_id: Option<&str>) -> Assignment {
        self.assignment_with_rng(experiment_id, user_id, &mut rand::thread_rng())
    }

    /// Assign and return the full [`Assignment`], drawing from `rng` when no
    /// user id is given.
    ///
    /// An empty `user_id` is treated as absent.
    #[must_use]
    pub fn assignment_with_rng<R: Rng>(
        &self,
        experiment_id: &str,
        user_id: Option<&str>,
        rng: &mut R,
    ) -> Assignment {
        let user_id = user_id.filter(|id| !id.is_empty());

        let variant_id = match self.registry.get_experiment(experiment_id) {
            Ok(experiment) => {
                let point = user_id.map_or_else(
                    || rng.gen::<f64>(),
                    |id| normalize_hash(bucket_hash(id, experiment_id)),
                );
                select_variant(experiment.variants(), point)
                    .map_or(DEFAULT_VARIANT, Variant::id)
                    .to_string()
            }
            Err(err) => {
                tracing::warn!(experiment_id, error = %err, "unknown experiment, serving default variant");
                DEFAULT_VARIANT.to_string()
            }
        };

        tracing::debug!(
            experiment_id,
            variant_id = %variant_id,
            deterministic = user_id.is_some(),
            "variant assigned"
        );

        Assignment {
            experiment_id: experiment_id.to_string(),
            variant_id,
            user_id: user_id.map(str::to_string),
        }
    }
}
