use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::StateLimits;
use crate::DomainParameters;

/// Server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Hostname or IP address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Domain parameters served to provers.
    pub parameters: ParameterSet,
    /// Seconds a pending challenge waits for its response.
    pub challenge_ttl_secs: u64,
    /// Seconds an authenticated session lasts without logout.
    pub session_ttl_secs: u64,
    /// Most registered identities.
    pub max_identities: usize,
    /// Most sessions holding a pending challenge at once.
    pub max_pending_challenges: usize,
    /// Most authenticated sessions at once.
    pub max_sessions: usize,
    /// Seconds between sweeps of expired state.
    pub cleanup_interval_secs: u64,
}

/// Named domain parameter sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ParameterSet {
    /// `p = 2695139`, `g = 2`. Tests and demonstrations only.
    #[serde(rename = "demo")]
    #[value(name = "demo")]
    Demo,
    /// RFC 3526 2048-bit MODP group, `g = 2`.
    #[default]
    #[serde(rename = "rfc3526-2048")]
    #[value(name = "rfc3526-2048")]
    Modp2048,
}

impl ParameterSet {
    /// Builds the domain parameters for this set.
    pub fn domain_parameters(self) -> DomainParameters {
        match self {
            ParameterSet::Demo => DomainParameters::demo(),
            ParameterSet::Modp2048 => DomainParameters::rfc3526_2048(),
        }
    }
}

impl ServerConfig {
    /// Converts host and port into a socket address.
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Lifetimes and caps for the server state.
    pub fn limits(&self) -> StateLimits {
        StateLimits {
            challenge_ttl: Duration::from_secs(self.challenge_ttl_secs),
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            max_identities: self.max_identities,
            max_pending_challenges: self.max_pending_challenges,
            max_sessions: self.max_sessions,
        }
    }

    /// Period of the expired-state sweep.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = StateLimits::default();

        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            parameters: ParameterSet::default(),
            challenge_ttl_secs: limits.challenge_ttl.as_secs(),
            session_ttl_secs: limits.session_ttl.as_secs(),
            max_identities: limits.max_identities,
            max_pending_challenges: limits.max_pending_challenges,
            max_sessions: limits.max_sessions,
            cleanup_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from defaults, `.env`, a TOML file and environment
    /// variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `SERVER_` prefix (e.g., `SERVER_PORT=8080`)
    /// 2. TOML configuration file (if exists)
    /// 3. `.env` file (if exists)
    /// 4. Built-in defaults
    ///
    /// The TOML file path can be set via `SERVER_CONFIG_PATH`. If not set,
    /// defaults to `./config/server.toml`. A missing file is skipped.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// SERVER_HOST=0.0.0.0
    /// SERVER_PORT=8080
    /// SERVER_PARAMETERS=demo
    /// SERVER_CHALLENGE_TTL_SECS=120
    /// ```
    ///
    /// # Errors
    /// Returns an error if the configuration is malformed or contains invalid values.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        // Attempt to load .env file (silently ignore if it doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("SERVER_CONFIG_PATH")
            .unwrap_or_else(|_| "config/server.toml".to_string());

        Self::figment(&config_path).extract()
    }

    fn figment(config_path: &str) -> figment::Figment {
        use figment::Figment;
        use figment::providers::{Env, Format, Serialized, Toml};

        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SERVER_").ignore(&["CONFIG_PATH"]))
    }

    /// Validates the configuration before the server starts.
    ///
    /// # Errors
    /// Returns an error message if the address cannot be parsed, a lifetime
    /// or the cleanup interval is zero, or the selected parameters are
    /// malformed.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host cannot be empty".to_string());
        }

        if self.challenge_ttl_secs == 0 || self.session_ttl_secs == 0 {
            return Err("challenge and session lifetimes must be positive".to_string());
        }

        if self.cleanup_interval_secs == 0 {
            return Err("cleanup interval must be positive".to_string());
        }

        self.addr().map_err(|e| {
            format!(
                "Invalid server address (host: {}, port: {}): {e}",
                self.host, self.port
            )
        })?;

        self.parameters
            .domain_parameters()
            .validate()
            .map_err(|e| e.to_string())
    }
}
