//! Identity providers - stable anonymous user ids
//!
//! The assigner never reads ambient storage. Whatever persists the user id
//! (browser storage, a cookie, a file) sits behind [`IdentityProvider`] and the
//! id is passed into assignment as a plain parameter.
//!
//! # Example
//!
//! ```rust
//! use variant_bucketing::identity::{IdentityProvider, MemoryIdentityProvider};
//!
//! let identity = MemoryIdentityProvider::new();
//! let id = identity.get_or_create_user_id();
//! assert!(id.starts_with("user_"));
//! assert_eq!(id, identity.get_or_create_user_id());
//! ```

mod file;
mod memory;

pub use file::FileIdentityProvider;
pub use memory::MemoryIdentityProvider;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix of generated user ids.
pub const USER_ID_PREFIX: &str = "user_";

/// Number of random alphanumeric characters after the prefix.
pub const USER_ID_RANDOM_LEN: usize = 16;

/// Supplies a stable, non-empty per-user identifier.
///
/// Implementations must return the same id on every call for the same client
/// and must not fail: a storage problem degrades to an ephemeral id.
pub trait IdentityProvider: Send + Sync {
    /// Return the persisted id, creating and persisting one on first use.
    fn get_or_create_user_id(&self) -> String;
}

/// Generate a fresh random user id, e.g. `user_Q3fz81LkPq0aZx7M`.
#[must_use]
pub fn generate_user_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(USER_ID_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{USER_ID_PREFIX}{suffix}")
}

/// Identity fixed at construction, for hosts that already know the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    user_id: String,
}

impl StaticIdentity {
    /// Wrap an existing user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn get_or_create_user_id(&self) -> String {
        self.user_id.clone()
    }
}
