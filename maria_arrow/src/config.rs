//! Connection parameters and the YAML file that persists them.
//!
//! The password is never written to disk. It can be read from the file if a
//! user adds it by hand, but normally it is resolved at connect time by
//! [crate::credentials::CredentialResolver].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConnectorError;

/// File name of the default configuration, placed in the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".maria_arrow.yml";

/// Port used when the configuration does not name one.
pub const DEFAULT_PORT: u16 = 3306;

/// TLS negotiation mode, named after the MariaDB client `--ssl-mode` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SslMode {
    Disabled,
    /// Use TLS only when a CA certificate is configured.
    #[default]
    Preferred,
    /// Encrypt, but do not verify the server certificate.
    Required,
    /// Verify the certificate chain, but not the host name.
    VerifyCa,
    VerifyIdentity,
}

/// Parameters needed to open a connection.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub dbname: String,

    #[serde(default)]
    pub sslmode: SslMode,

    #[serde(default)]
    pub sslca: Option<PathBuf>,

    #[serde(default)]
    pub sslkey: Option<PathBuf>,

    #[serde(default)]
    pub sslcert: Option<PathBuf>,

    /// Held in memory only.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Placeholder values written to a fresh configuration file.
    pub fn placeholder() -> Self {
        ConnectionConfig {
            username: String::new(),
            host: "localhost".to_string(),
            port: Some(DEFAULT_PORT),
            dbname: String::new(),
            ..Default::default()
        }
    }

    /// True when everything that is persisted has been filled in.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.host.is_empty() && !self.dbname.is_empty()
    }

    /// Checks that the credentials are usable.
    ///
    /// Called before every connection attempt, after the password has been resolved.
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.username.is_empty() {
            return Err(ConnectorError::InvalidConfiguration(
                "username is empty".to_string(),
            ));
        }
        match self.password.as_deref() {
            None | Some("") => Err(ConnectorError::InvalidConfiguration(
                "password is empty".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("username", &self.username)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("sslmode", &self.sslmode)
            .field("sslca", &self.sslca)
            .field("sslkey", &self.sslkey)
            .field("sslcert", &self.sslcert)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `~/.maria_arrow.yml`, or a relative path when the home directory is unknown.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Persist a configuration, without its password.
pub fn write_config(path: &Path, config: &ConnectionConfig) -> Result<(), ConnectorError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;

    log::warn!(
        "wrote connection configuration to {}; review its contents before connecting",
        path.display()
    );
    Ok(())
}

/// Load a configuration from `path`.
///
/// When the file does not exist, `fallback` is written in its place. The call then
/// succeeds only if `fallback` was already complete; otherwise the caller has to
/// edit the file first and gets [ConnectorError::MissingConfigFile].
pub fn read_config(
    path: &Path,
    fallback: ConnectionConfig,
) -> Result<ConnectionConfig, ConnectorError> {
    if !path.exists() {
        write_config(path, &fallback)?;

        return if fallback.is_complete() {
            Ok(fallback)
        } else {
            Err(ConnectorError::MissingConfigFile {
                path: path.to_path_buf(),
            })
        };
    }

    let contents = fs::read_to_string(path)?;
    let config: Option<ConnectionConfig> = if contents.trim().is_empty() {
        None
    } else {
        serde_yaml::from_str(&contents)?
    };

    match config {
        Some(config) if config != ConnectionConfig::default() => {
            log::debug!("read connection configuration from {}", path.display());
            Ok(config)
        }
        _ => Err(ConnectorError::InvalidConfiguration(format!(
            "{} contains no connection parameters",
            path.display()
        ))),
    }
}
