use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub oracle: OracleSettings,
    pub directory: DirectorySettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleSettings {
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,
    /// Empty key disables AI discovery entirely; the cascade then runs
    /// local -> static.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

fn default_oracle_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_oracle_model() -> String {
    "gemini-pro".to_string()
}
fn default_oracle_timeout() -> u64 {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    /// "static" serves the seeded marketplace snapshot; "http" reads the
    /// live document store.
    #[serde(default = "default_directory_mode")]
    pub mode: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub collections: CollectionSettings,
}

fn default_directory_mode() -> String {
    "static".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_offers_collection")]
    pub offers: String,
    #[serde(default = "default_requirements_collection")]
    pub requirements: String,
    #[serde(default = "default_counterparts_collection")]
    pub counterparts: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            offers: default_offers_collection(),
            requirements: default_requirements_collection(),
            counterparts: default_counterparts_collection(),
        }
    }
}

fn default_offers_collection() -> String {
    "material_offers".to_string()
}
fn default_requirements_collection() -> String {
    "material_requirements".to_string()
}
fn default_counterparts_collection() -> String {
    "counterparts".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_min_deal_score")]
    pub min_deal_score: u8,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_deal_score: default_min_deal_score(),
        }
    }
}

fn default_limit() -> usize {
    20
}
fn default_min_deal_score() -> u8 {
    60
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_material_weight")]
    pub material: f64,
    #[serde(default = "default_quantity_weight")]
    pub quantity: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_location_fallback_weight")]
    pub location_fallback: f64,
    #[serde(default = "default_same_city_weight")]
    pub same_city: f64,
    #[serde(default = "default_quantity_range_weight")]
    pub quantity_range: f64,
    #[serde(default = "default_non_hazard_weight")]
    pub non_hazard: f64,
    #[serde(default = "default_circular_weight")]
    pub circular: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            material: default_material_weight(),
            quantity: default_quantity_weight(),
            location: default_location_weight(),
            location_fallback: default_location_fallback_weight(),
            same_city: default_same_city_weight(),
            quantity_range: default_quantity_range_weight(),
            non_hazard: default_non_hazard_weight(),
            circular: default_circular_weight(),
        }
    }
}

impl From<WeightsConfig> for ScoringWeights {
    fn from(w: WeightsConfig) -> Self {
        Self {
            material: w.material,
            quantity: w.quantity,
            location: w.location,
            location_fallback: w.location_fallback,
            same_city: w.same_city,
            quantity_range: w.quantity_range,
            non_hazard: w.non_hazard,
            circular: w.circular,
        }
    }
}

fn default_material_weight() -> f64 { 40.0 }
fn default_quantity_weight() -> f64 { 30.0 }
fn default_location_weight() -> f64 { 30.0 }
fn default_location_fallback_weight() -> f64 { 10.0 }
fn default_same_city_weight() -> f64 { 25.0 }
fn default_quantity_range_weight() -> f64 { 15.0 }
fn default_non_hazard_weight() -> f64 { 10.0 }
fn default_circular_weight() -> f64 { 10.0 }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with RECIRCLE_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with RECIRCLE_)
            // e.g., RECIRCLE_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RECIRCLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RECIRCLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Pull secrets from bare environment variables so deployments don't have to
/// inline them in config files.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    // GEMINI_API_KEY is checked first for parity with the hosted setup.
    let oracle_api_key = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("RECIRCLE_ORACLE__API_KEY"))
        .ok();
    let directory_api_key = env::var("RECIRCLE_DIRECTORY__API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = oracle_api_key {
        builder = builder.set_override("oracle.api_key", api_key)?;
    }
    if let Some(api_key) = directory_api_key {
        builder = builder.set_override("directory.api_key", api_key)?;
    }

    builder.build()
}
