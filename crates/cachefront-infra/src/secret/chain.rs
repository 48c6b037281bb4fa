//! Secret chain builder -- wires concrete providers in priority order.
//!
//! This module lives in `cachefront-infra` because it assembles concrete
//! provider implementations. The resulting resolver is consumed once at
//! startup; credentials are immutable for the rest of the run.
//!
//! Chain order (first match wins, per key): environment variables, then the
//! config file's `[credentials]` table.

use cachefront_core::secrets::CredentialsResolver;

use crate::config::CredentialsSection;
use crate::secret::SecretProvider;
use crate::secret::env::EnvSecretStore;
use crate::secret::file::FileSecretStore;

/// Build the default secret resolution chain.
pub fn build_secret_chain(credentials: &CredentialsSection) -> CredentialsResolver<SecretProvider> {
    CredentialsResolver::new(vec![
        SecretProvider::Env(EnvSecretStore::new()),
        SecretProvider::File(FileSecretStore::new(credentials)),
    ])
}
