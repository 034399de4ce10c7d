use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub donations: DonationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DonationConfig {
    /// ISO 4217 code shown next to every amount.
    pub currency: String,
    /// Quick-select amounts, in major units.
    pub preset_amounts: Vec<u32>,
    /// Upper bound for a single donation, in minor units.
    pub max_amount_minor: i64,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            preset_amounts: vec![100, 500, 1000, 5000],
            max_amount_minor: 1_000_000_000,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // A missing .env is fine; real deployments use plain env vars
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://donatrack.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.secure_cookies", false)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with DONATRACK__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("DONATRACK").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://donatrack.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                secure_cookies: false,
            },
            donations: DonationConfig::default(),
        }
    }
}
