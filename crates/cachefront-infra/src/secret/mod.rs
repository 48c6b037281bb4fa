//! Concrete secret providers behind the `SecretStore` port.
//!
//! Two read-only sources: environment variables and the `[credentials]`
//! table of the config file. [`chain::build_secret_chain`] wires them in
//! priority order.

pub mod chain;
pub mod env;
pub mod file;

use cachefront_core::secrets::SecretStore;
use cachefront_types::error::SecretError;

use self::env::EnvSecretStore;
use self::file::FileSecretStore;

/// A concrete provider in the resolution chain.
///
/// The chain is a homogeneous `Vec`, so the providers are wrapped in one
/// enum rather than boxed behind a trait object.
pub enum SecretProvider {
    Env(EnvSecretStore),
    File(FileSecretStore),
}

impl SecretStore for SecretProvider {
    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        match self {
            SecretProvider::Env(p) => p.get(key).await,
            SecretProvider::File(p) => p.get(key).await,
        }
    }
}
