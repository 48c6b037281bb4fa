use thiserror::Error;

/// Fatal configuration errors, detected before any remote mutation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingSetting(String),

    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("duplicate resource name '{0}'")]
    DuplicateResource(String),

    #[error("resource '{resource}' depends on unknown resource '{dependency}'")]
    UnknownDependency { resource: String, dependency: String },

    #[error("circular dependency involving resource '{0}'")]
    CircularDependency(String),
}

/// Errors surfaced while resolving deferred values across the resource graph.
///
/// Clone is required: resolution errors travel through shared futures and are
/// observed by every downstream consumer of the failed value.
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    #[error("deferred value '{0}' was never resolved")]
    Unresolved(String),

    #[error("resource '{resource}' produced no output named '{output}'")]
    MissingOutput { resource: String, output: String },
}

/// Errors from materializing resources against the backing platform.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("backend rejected '{resource}': {reason}")]
    Rejected { resource: String, reason: String },

    #[error("state I/O error: {0}")]
    StateIo(String),

    #[error("provisioning run cancelled")]
    Cancelled,
}

/// Errors from secret resolution.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("secret read error: {0}")]
    ReadError(String),
}
