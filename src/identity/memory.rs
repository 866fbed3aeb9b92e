//! In-process identity: one generated id for the lifetime of the provider.
//!
//! Nothing is persisted, so a restart yields a new user.

use std::sync::OnceLock;

use super::{generate_user_id, IdentityProvider};

/// Lazily generates a user id on first request and returns it thereafter.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    user_id: OnceLock<String>,
}

impl MemoryIdentityProvider {
    /// Create a provider with no id yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn get_or_create_user_id(&self) -> String {
        self.user_id.get_or_init(generate_user_id).clone()
    }
}
