use crate::error::Error;

pub const ENV_PREFIX: &str = "DEMO";
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8125;

/// Settings read from `DEMO_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub port: u16,
    pub namespace: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            port: DEFAULT_PORT,
            namespace: String::new(),
            environment: String::new(),
        }
    }
}

impl Config {
    /// Loads the configuration through `lookup`, which is called with the full variable name
    /// (e.g. `DEMO_SIDECAR_PORT`). Unset variables keep their defaults.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the port value does not parse as a `u16`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));
        let mut config = Self::default();

        if let Some(endpoint) = var("SIDECAR_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(port) = var("SIDECAR_PORT") {
            config.port = port.parse().map_err(|source| Error::InvalidConfig {
                key: "DEMO_SIDECAR_PORT",
                value: port.clone(),
                source,
            })?;
        }
        if let Some(namespace) = var("DD_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Some(environment) = var("ENVIRONMENT") {
            config.environment = environment;
        }

        Ok(config)
    }

    /// The `host:port` address of the sidecar.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.endpoint, self.port)
    }
}
