//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup into an immutable `Config`; handlers
//! never touch the process environment directly.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and redirect targets
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Identity provider base URL
    pub identity_api_url: String,

    // --- Secrets ---
    /// Identity provider server API key
    pub identity_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,

    // --- Payment fee constants ---
    pub fees: FeeConfig,
}

/// Payment-processing fee constants.
///
/// Defaults match the card processor's published pricing; overridable via
/// environment for regions with different rates.
#[derive(Debug, Clone)]
pub struct FeeConfig {
    /// Percentage of the gross amount (e.g. 0.029 = 2.9%)
    pub percentage_fee: f64,
    /// Flat per-transaction fee in currency units
    pub fixed_fee: f64,
    /// One-time fee charged when a trip is activated
    pub trip_activation_fee: f64,
}

pub const DEFAULT_PERCENTAGE_FEE: f64 = 0.029;
pub const DEFAULT_FIXED_FEE: f64 = 0.30;
pub const DEFAULT_TRIP_ACTIVATION_FEE: f64 = 10.00;

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            percentage_fee: DEFAULT_PERCENTAGE_FEE,
            fixed_fee: DEFAULT_FIXED_FEE,
            trip_activation_fee: DEFAULT_TRIP_ACTIVATION_FEE,
        }
    }
}

impl FeeConfig {
    fn from_env() -> Self {
        let parse = |name: &str, default: f64| {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(default)
        };

        Self {
            percentage_fee: parse("PERCENTAGE_FEE", DEFAULT_PERCENTAGE_FEE),
            fixed_fee: parse("FIXED_FEE", DEFAULT_FIXED_FEE),
            trip_activation_fee: parse("TRIP_ACTIVATION_FEE", DEFAULT_TRIP_ACTIVATION_FEE),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, secrets can be set via a `.env` file. In
    /// production they are injected as environment variables by the deploy
    /// environment's secret bindings.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            identity_api_url: env::var("IDENTITY_API_URL")
                .map_err(|_| ConfigError::Missing("IDENTITY_API_URL"))?,

            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),

            fees: FeeConfig::from_env(),
        })
    }

    /// Fixed configuration for tests (no environment reads).
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            identity_api_url: "http://localhost:9099".to_string(),
            identity_api_key: "test_api_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            fees: FeeConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_defaults() {
        let fees = FeeConfig::default();
        assert_eq!(fees.percentage_fee, 0.029);
        assert_eq!(fees.fixed_fee, 0.30);
        assert_eq!(fees.trip_activation_fee, 10.00);
    }

    #[test]
    fn test_config_test_default() {
        let config = Config::test_default();
        assert_eq!(config.port, 8080);
        assert!(config.jwt_signing_key.len() >= 16);
        assert_eq!(config.fees.percentage_fee, 0.029);
    }
}
