//! Environment variable secret provider.
//!
//! The highest-priority provider in the resolution chain: env vars override
//! the config file. Key resolution maps the logical key to an uppercased,
//! prefixed variable name, e.g. `username` -> `CACHEFRONT_USERNAME`.

use cachefront_core::secrets::SecretStore;
use cachefront_types::error::SecretError;

/// Prefix for all recognized environment variables.
const ENV_PREFIX: &str = "CACHEFRONT";

/// Environment variable secret provider. Read-only by nature.
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    fn var_name(key: &str) -> String {
        format!("{ENV_PREFIX}_{}", key.to_uppercase().replace('-', "_"))
    }
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for EnvSecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        match std::env::var(Self::var_name(key)) {
            Ok(val) => Ok(Some(val)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                // Env var exists but has invalid Unicode -- treat as not found
                // rather than erroring, since secrets must be valid strings
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_name_mapping() {
        assert_eq!(EnvSecretStore::var_name("username"), "CACHEFRONT_USERNAME");
        assert_eq!(EnvSecretStore::var_name("password"), "CACHEFRONT_PASSWORD");
    }

    #[tokio::test]
    async fn test_get_existing() {
        // SAFETY: This test runs serially (single-threaded test) and we clean up after.
        unsafe { std::env::set_var("CACHEFRONT_TEST_SECRET_1", "test-value-123") };

        let provider = EnvSecretStore::new();
        let result = provider.get("test_secret_1").await.unwrap();
        assert_eq!(result, Some("test-value-123".to_string()));

        // SAFETY: This test runs serially and the var was just set above.
        unsafe { std::env::remove_var("CACHEFRONT_TEST_SECRET_1") };
    }

    #[tokio::test]
    async fn test_get_missing() {
        let provider = EnvSecretStore::new();
        let result = provider.get("nonexistent_var_xyz_123").await.unwrap();
        assert!(result.is_none());
    }
}
