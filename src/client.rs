//! Experiment client - assignment plus fire-and-forget reporting
//!
//! Binds a registry, an [`IdentityProvider`] and an [`ExposureSink`] so the
//! rendering layer only ever deals with experiment ids and variant ids.
//! No method here returns an error: lookups degrade to
//! [`DEFAULT_VARIANT`](crate::DEFAULT_VARIANT) and sink failures are logged
//! and dropped.

use std::sync::Arc;

use crate::assign::{Assignment, VariantAssigner};
use crate::identity::IdentityProvider;
use crate::registry::ExperimentRegistry;
use crate::tracking::{ExperimentEvent, ExposureSink};

/// Entry point for hosts: variant lookup, exposure and conversion reporting.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use variant_bucketing::identity::StaticIdentity;
/// use variant_bucketing::registry::ExperimentRegistry;
/// use variant_bucketing::tracking::MemoryExposureSink;
/// use variant_bucketing::ExperimentClient;
///
/// let registry = ExperimentRegistry::from_json_str(
///     r#"{ "heroCTA": { "variants": [
///         { "id": "control", "weight": 0.5 },
///         { "id": "variant-a", "weight": 0.5 } ] } }"#,
/// )?;
/// let sink = Arc::new(MemoryExposureSink::new());
/// let client = ExperimentClient::new(
///     Arc::new(registry),
///     StaticIdentity::new("user_42"),
///     Arc::clone(&sink),
/// );
///
/// let variant = client.variant("heroCTA");
/// client.report_conversion("heroCTA", "click");
///
/// let tally = sink.tally("heroCTA", &variant);
/// assert_eq!(tally.exposures, 1);
/// assert_eq!(tally.total_conversions(), 1);
/// # Ok::<(), variant_bucketing::Error>(())
/// ```
#[derive(Debug)]
pub struct ExperimentClient<I, S> {
    assigner: VariantAssigner,
    identity: I,
    sink: S,
}

impl<I: IdentityProvider, S: ExposureSink> ExperimentClient<I, S> {
    /// Create a client over a shared registry.
    #[must_use]
    pub const fn new(registry: Arc<ExperimentRegistry>, identity: I, sink: S) -> Self {
        Self {
            assigner: VariantAssigner::new(registry),
            identity,
            sink,
        }
    }

    /// Get the assigner, for callers that supply user ids themselves.
    #[must_use]
    pub const fn assigner(&self) -> &VariantAssigner {
        &self.assigner
    }

    /// Get the identity provider.
    #[must_use]
    pub const fn identity(&self) -> &I {
        &self.identity
    }

    /// Get the event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Assign the current user without reporting an exposure.
    #[must_use]
    pub fn assignment(&self, experiment_id: &str) -> Assignment {
        let user_id = self.identity.get_or_create_user_id();
        self.assigner.assignment(experiment_id, Some(&user_id))
    }

    /// Assign the current user and report the exposure.
    pub fn variant(&self, experiment_id: &str) -> String {
        self.variant_with_metadata(experiment_id, None)
    }

    /// Assign the current user and report the exposure with metadata attached.
    pub fn variant_with_metadata(
        &self,
        experiment_id: &str,
        metadata: Option<serde_json::Value>,
    ) -> String {
        let variant_id = self.assignment(experiment_id).into_variant_id();
        self.report_exposure(experiment_id, &variant_id, metadata);
        variant_id
    }

    /// Report that the current user saw `variant_id`. Never fails.
    pub fn report_exposure(
        &self,
        experiment_id: &str,
        variant_id: &str,
        metadata: Option<serde_json::Value>,
    ) {
        let event = ExperimentEvent::exposure(experiment_id, variant_id, metadata);
        if let Err(err) = self.sink.report_exposure(&event) {
            tracing::warn!(experiment_id, variant_id, error = %err, "dropped exposure event");
        }
    }

    /// Re-derive the current user's variant and report a conversion for it.
    pub fn report_conversion(&self, experiment_id: &str, conversion_type: &str) {
        self.report_conversion_with_metadata(experiment_id, conversion_type, None);
    }

    /// Like [`Self::report_conversion`], with metadata attached.
    pub fn report_conversion_with_metadata(
        &self,
        experiment_id: &str,
        conversion_type: &str,
        metadata: Option<serde_json::Value>,
    ) {
        let assignment = self.assignment(experiment_id);
        let event = ExperimentEvent::conversion(
            experiment_id,
            assignment.variant_id(),
            conversion_type,
            metadata,
        );
        if let Err(err) = self.sink.report_conversion(&event) {
            tracing::warn!(
                experiment_id,
                variant_id = assignment.variant_id(),
                conversion_type,
                error = %err,
                "dropped conversion event"
            );
        }
    }
}
