//! Exposure and conversion reporting
//!
//! The crate builds well-formed [`ExperimentEvent`]s and hands them to an
//! injected [`ExposureSink`]. Delivery belongs to the sink. Callers go through
//! [`crate::ExperimentClient`], which swallows sink errors so a broken
//! analytics pipeline never reaches the rendering layer.
//!
//! ## Payload
//!
//! ```text
//! { "kind": "conversion", "experimentId": "heroCTA", "variantId": "variant-a",
//!   "conversionType": "click", "timestamp": "2026-10-18T09:12:44Z" }
//! ```

mod memory;
#[cfg(feature = "tokio")]
mod channel;

pub use memory::{MemoryExposureSink, VariantTally};
#[cfg(feature = "tokio")]
pub use channel::ChannelExposureSink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Kind of experiment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The user saw the variant.
    Exposure,
    /// The user completed a tracked action.
    Conversion,
}

/// Event sent to the analytics collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentEvent {
    kind: EventKind,
    experiment_id: String,
    variant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conversion_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl ExperimentEvent {
    /// Build an exposure event stamped with the current time.
    #[must_use]
    pub fn exposure(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            kind: EventKind::Exposure,
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            conversion_type: None,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Build a conversion event stamped with the current time.
    #[must_use]
    pub fn conversion(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        conversion_type: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            kind: EventKind::Conversion,
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            conversion_type: Some(conversion_type.into()),
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Get the event kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the variant ID.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the conversion type (conversions only).
    #[must_use]
    pub fn conversion_type(&self) -> Option<&str> {
        self.conversion_type.as_deref()
    }

    /// Get the caller-supplied metadata, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    /// Get the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Receiver of exposure and conversion events.
///
/// Implementations must not block. Returned errors are logged and dropped by
/// the caller.
pub trait ExposureSink: Send + Sync {
    /// Record that a user saw a variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be handed to the transport.
    fn report_exposure(&self, event: &ExperimentEvent) -> Result<()>;

    /// Record that a bucketed user completed a tracked action.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be handed to the transport.
    fn report_conversion(&self, event: &ExperimentEvent) -> Result<()>;
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ExposureSink for NoopSink {
    fn report_exposure(&self, _event: &ExperimentEvent) -> Result<()> {
        Ok(())
    }

    fn report_conversion(&self, _event: &ExperimentEvent) -> Result<()> {
        Ok(())
    }
}

impl<S: ExposureSink + ?Sized> ExposureSink for std::sync::Arc<S> {
    fn report_exposure(&self, event: &ExperimentEvent) -> Result<()> {
        (**self).report_exposure(event)
    }

    fn report_conversion(&self, event: &ExperimentEvent) -> Result<()> {
        (**self).report_conversion(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposure_payload_shape() {
        let event = ExperimentEvent::exposure("heroCTA", "variant-a", None);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "exposure");
        assert_eq!(json["experimentId"], "heroCTA");
        assert_eq!(json["variantId"], "variant-a");
        assert!(json.get("conversionType").is_none());
        assert!(json.get("metadata").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_conversion_payload_shape() {
        let meta = serde_json::json!({"section": "hero"});
        let event = ExperimentEvent::conversion("heroCTA", "control", "click", Some(meta.clone()));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "conversion");
        assert_eq!(json["conversionType"], "click");
        assert_eq!(json["metadata"], meta);
        assert_eq!(event.conversion_type(), Some("click"));
    }

    #[test]
    fn test_event_deserialize() {
        let event = ExperimentEvent::conversion("e", "v", "submit", None);
        let json = serde_json::to_string(&event).unwrap();
        let back: ExperimentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_noop_sink() {
        let sink = NoopSink;
        let event = ExperimentEvent::exposure("e", "v", None);
        assert!(sink.report_exposure(&event).is_ok());
        assert!(sink.report_conversion(&event).is_ok());
    }
}
