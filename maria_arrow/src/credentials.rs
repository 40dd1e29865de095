//! Obtaining the password once per session.

use std::io::IsTerminal;

use crate::config::ConnectionConfig;
use crate::errors::ConnectorError;

/// Environment variable read by [EnvSecret::default].
pub const PASSWORD_ENV_VAR: &str = "MARIADB_PASSWORD";

/// Something that can provide a secret.
pub trait SecretSource {
    /// Returns `None` when this source has nothing to offer, so the next one can be tried.
    fn secret(&mut self, label: &str) -> Result<Option<String>, ConnectorError>;
}

/// Reads the secret from an environment variable.
pub struct EnvSecret {
    var: String,
}

impl EnvSecret {
    pub fn new(var: impl Into<String>) -> Self {
        EnvSecret { var: var.into() }
    }
}

impl Default for EnvSecret {
    fn default() -> Self {
        EnvSecret::new(PASSWORD_ENV_VAR)
    }
}

impl SecretSource for EnvSecret {
    fn secret(&mut self, _label: &str) -> Result<Option<String>, ConnectorError> {
        Ok(std::env::var(&self.var).ok())
    }
}

/// Non-echoing prompt on the controlling terminal.
///
/// Offers nothing when stdin is not a terminal.
#[derive(Default)]
pub struct TerminalPrompt;

impl SecretSource for TerminalPrompt {
    fn secret(&mut self, label: &str) -> Result<Option<String>, ConnectorError> {
        if !std::io::stdin().is_terminal() {
            return Ok(None);
        }
        let password = rpassword::prompt_password(format!("{label}: "))?;
        Ok(Some(password))
    }
}

/// A secret known up front.
pub struct StaticSecret(pub String);

impl SecretSource for StaticSecret {
    fn secret(&mut self, _label: &str) -> Result<Option<String>, ConnectorError> {
        Ok(Some(self.0.clone()))
    }
}

/// Tries secret sources in order until one produces a password.
pub struct CredentialResolver {
    sources: Vec<Box<dyn SecretSource>>,
}

impl CredentialResolver {
    pub fn new(sources: Vec<Box<dyn SecretSource>>) -> Self {
        CredentialResolver { sources }
    }

    /// A resolver that never finds anything.
    pub fn none() -> Self {
        CredentialResolver::new(Vec::new())
    }

    /// Fill in `config.password` if it is missing.
    ///
    /// A password that is present, even an empty one, is left as is.
    /// An empty secret from a source counts as nothing offered.
    pub fn resolve(&mut self, config: &mut ConnectionConfig) -> Result<(), ConnectorError> {
        if config.password.is_some() {
            return Ok(());
        }

        let label = format!("Password for {}@{}", config.username, config.host);
        for source in &mut self.sources {
            if let Some(secret) = source.secret(&label)?.filter(|s| !s.is_empty()) {
                config.password = Some(secret);
                return Ok(());
            }
        }
        Err(ConnectorError::CredentialUnavailable)
    }
}

impl Default for CredentialResolver {
    /// Environment first, then the terminal.
    fn default() -> Self {
        let sources: Vec<Box<dyn SecretSource>> =
            vec![Box::<EnvSecret>::default(), Box::new(TerminalPrompt)];
        CredentialResolver::new(sources)
    }
}
