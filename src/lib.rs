//! # variant-bucketing: Deterministic Weighted Experiment Assignment
//!
//! **Version**: 0.1.0
//!
//! Buckets anonymous users into named experiment variants for lightweight A/B
//! testing of UI copy and layout. The same user id always lands in the same
//! variant, so a visitor sees a consistent page across loads and sessions
//! without any server-side session storage.
//!
//! ## Design Principles
//!
//! - **Fail fast on config**: weight sums and variant lists are validated when
//!   the registry is built, never per call
//! - **Never break the page**: unknown experiments resolve to
//!   [`DEFAULT_VARIANT`] and analytics failures are swallowed
//! - **Frozen bucketing**: hash family, normalization constant and variant
//!   order together define which bucket a user falls in
//! - **Injected collaborators**: identity storage and analytics sit behind
//!   [`identity::IdentityProvider`] and [`tracking::ExposureSink`]
//!
//! ## Architecture
//!
//! ```text
//! IdentityProvider ──user id──┐
//!                             ▼
//! ExperimentRegistry ──► VariantAssigner ──variant id──► renderer
//!                             │
//!                             ▼
//!                       ExposureSink (exposure / conversion events)
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use variant_bucketing::assign::VariantAssigner;
//! use variant_bucketing::registry::ExperimentRegistry;
//!
//! let registry = ExperimentRegistry::from_json_str(r#"{
//!     "heroCTA": {
//!         "name": "Hero call to action",
//!         "variants": [
//!             { "id": "control",   "weight": 0.34 },
//!             { "id": "variant-a", "weight": 0.33 },
//!             { "id": "variant-b", "weight": 0.33 }
//!         ]
//!     }
//! }"#)?;
//!
//! let assigner = VariantAssigner::new(Arc::new(registry));
//! let variant = assigner.assign("heroCTA", Some("user_42"));
//! assert!(["control", "variant-a", "variant-b"].contains(&variant.as_str()));
//! # Ok::<(), variant_bucketing::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod assign;
pub mod client;
pub mod error;
pub mod identity;
pub mod logging;
pub mod registry;
pub mod tracking;

pub use assign::{Assignment, VariantAssigner};
pub use client::ExperimentClient;
pub use error::{Error, Result};
pub use registry::{Experiment, ExperimentRegistry, Variant};

/// Variant id served when an experiment id is not in the registry.
pub const DEFAULT_VARIANT: &str = "control";
