//! Config-file secret provider.
//!
//! Serves the values of the `[credentials]` table from `cachefront.toml`.
//! Lowest priority in the chain: anything set in the environment wins.

use cachefront_core::secrets::{PASSWORD_KEY, SecretStore, USERNAME_KEY};
use cachefront_types::error::SecretError;

use crate::config::CredentialsSection;

/// Secret provider backed by the already-parsed `[credentials]` table.
pub struct FileSecretStore {
    username: Option<String>,
    password: Option<String>,
}

impl FileSecretStore {
    pub fn new(section: &CredentialsSection) -> Self {
        Self {
            username: section.username.clone(),
            password: section.password.clone(),
        }
    }
}

impl SecretStore for FileSecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let value = match key {
            USERNAME_KEY => self.username.clone(),
            PASSWORD_KEY => self.password.clone(),
            _ => None,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_known_keys() {
        let store = FileSecretStore::new(&CredentialsSection {
            username: Some("alice".to_string()),
            password: Some("s3cret".to_string()),
        });
        assert_eq!(store.get("username").await.unwrap().as_deref(), Some("alice"));
        assert_eq!(store.get("password").await.unwrap().as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_unknown_key_is_none() {
        let store = FileSecretStore::new(&CredentialsSection::default());
        assert!(store.get("api_token").await.unwrap().is_none());
    }
}
