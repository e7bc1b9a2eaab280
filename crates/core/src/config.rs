use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `OFFER_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub bandit: BanditConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Defaults applied when a sample request omits its strategy tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct BanditConfig {
    #[serde(default = "default_exploration_c")]
    pub exploration_c: f64,
    #[serde(default = "default_prior_a")]
    pub prior_a: f64,
    #[serde(default = "default_prior_b")]
    pub prior_b: f64,
    /// Fixed RNG seed for Thompson draws. Unset means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_exploration_c() -> f64 {
    1.0
}
fn default_prior_a() -> f64 {
    1.0
}
fn default_prior_b() -> f64 {
    1.0
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            exploration_c: default_exploration_c(),
            prior_a: default_prior_a(),
            prior_b: default_prior_b(),
            seed: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            bandit: BanditConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OFFER_EXPRESS")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
