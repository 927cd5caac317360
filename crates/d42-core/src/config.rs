// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Device42 appliance. They carry
// credential data and transport tuning, but never touch disk. `d42-config`
// (or any caller) constructs a `ConnectionConfig` and hands it in.

use std::sync::Arc;
use std::time::Duration;

use d42_api::{Credentials, DEFAULT_NO_TRAILING_SLASH, Device42Client, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for appliances.
    #[default]
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for connecting to a single appliance.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Appliance host name or address.
    pub host: String,
    /// HTTPS port.
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Overall request timeout. `None` inherits the HTTP client default.
    pub timeout: Option<Duration>,
    /// Resource path prefixes that never get a trailing slash.
    pub no_trailing_slash: Vec<String>,
}

pub const DEFAULT_PORT: u16 = 443;

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_PORT,
            username: "admin".into(),
            password: SecretString::from(String::new()),
            tls: TlsVerification::default(),
            timeout: None,
            no_trailing_slash: DEFAULT_NO_TRAILING_SLASH
                .iter()
                .map(|prefix| (*prefix).to_owned())
                .collect(),
        }
    }
}

impl ConnectionConfig {
    /// `https://{host}:{port}`
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let raw = format!("https://{}:{}", self.host, self.port);
        Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid appliance address {raw}: {e}"),
        })
    }

    /// Build the shared transport client.
    pub fn connect(&self) -> Result<Arc<Device42Client>, CoreError> {
        let transport = TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            no_trailing_slash: self.no_trailing_slash.clone(),
            cookie_jar: None,
        };
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        let client = Device42Client::new(self.base_url()?, credentials, &transport)?;
        Ok(Arc::new(client))
    }
}
