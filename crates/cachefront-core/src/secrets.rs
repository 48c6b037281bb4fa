//! Secret resolution ports and the credential service.
//!
//! The [`SecretStore`] trait is the port concrete providers in
//! `cachefront-infra` implement (environment variables, config file). The
//! [`CredentialsResolver`] chains providers in priority order, first match
//! wins per key, and normalizes the two optional secrets into an optional
//! [`Credentials`] pair -- read once at startup, immutable thereafter.

use cachefront_types::error::SecretError;
use cachefront_types::secret::Credentials;

/// Key for the basic-auth username secret.
pub const USERNAME_KEY: &str = "username";
/// Key for the basic-auth password secret.
pub const PASSWORD_KEY: &str = "password";

/// A read-only source of secret strings.
pub trait SecretStore: Send + Sync {
    /// Retrieve a secret by key. Returns `None` when this source does not
    /// hold the secret.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, SecretError>> + Send;
}

/// Resolves the credential pair through a chain of secret sources.
///
/// Sources are ordered by precedence (first match wins, per key -- the
/// username and password may come from different sources).
pub struct CredentialsResolver<S> {
    sources: Vec<S>,
}

impl<S: SecretStore> CredentialsResolver<S> {
    pub fn new(sources: Vec<S>) -> Self {
        Self { sources }
    }

    async fn lookup(&self, key: &str) -> Result<Option<String>, SecretError> {
        for source in &self.sources {
            if let Some(value) = source.get(key).await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Resolve both secrets and normalize them into an optional pair.
    ///
    /// Returns `None` unless BOTH resolve to non-empty values; a lone
    /// username or password silently disables authentication.
    pub async fn resolve(&self) -> Result<Option<Credentials>, SecretError> {
        let username = self.lookup(USERNAME_KEY).await?;
        let password = self.lookup(PASSWORD_KEY).await?;
        Ok(Credentials::from_parts(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    struct MapStore(HashMap<&'static str, &'static str>);

    impl SecretStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
            Ok(self.0.get(key).map(|v| v.to_string()))
        }
    }

    fn store(entries: &[(&'static str, &'static str)]) -> MapStore {
        MapStore(entries.iter().copied().collect())
    }

    #[tokio::test]
    async fn test_resolves_pair_from_single_source() {
        let resolver = CredentialsResolver::new(vec![store(&[
            ("username", "alice"),
            ("password", "s3cret"),
        ])]);
        let creds = resolver.resolve().await.unwrap().unwrap();
        assert_eq!(creds.username.expose(), "alice");
        assert_eq!(creds.password.expose(), "s3cret");
    }

    #[tokio::test]
    async fn test_first_source_wins_per_key() {
        let resolver = CredentialsResolver::new(vec![
            store(&[("username", "from-env")]),
            store(&[("username", "from-file"), ("password", "s3cret")]),
        ]);
        let creds = resolver.resolve().await.unwrap().unwrap();
        // username overridden by the higher-priority source, password
        // falls through to the lower one.
        assert_eq!(creds.username.expose(), "from-env");
        assert_eq!(creds.password.expose(), "s3cret");
    }

    #[tokio::test]
    async fn test_lone_secret_yields_no_credentials() {
        let resolver = CredentialsResolver::new(vec![store(&[("username", "alice")])]);
        assert!(resolver.resolve().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_sources_yields_no_credentials() {
        let resolver = CredentialsResolver::<MapStore>::new(vec![]);
        assert!(resolver.resolve().await.unwrap().is_none());
    }
}
