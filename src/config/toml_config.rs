use crate::adapters::geocoding::NominatimClient;
use crate::core::catalog::VehicleCatalog;
use crate::core::matcher::MatcherConfig;
use crate::core::ConfigProvider;
use crate::utils::error::{FillTripError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "filltrip.toml";
pub const API_BASE_ENV: &str = "FILLTRIP_API_BASE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub persistence: PersistenceConfig,
    pub routing: RoutingConfig,
    pub geocoding: GeocodingConfig,
    pub matcher: MatcherConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub auth_token: Option<String>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1/filltrip-db".to_string(),
            timeout_seconds: 10,
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mapbox.com/directions/v5/mapbox/driving".to_string(),
            access_token: None,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    /// Comma-separated ISO codes; empty searches worldwide.
    pub country_codes: String,
    pub limit: usize,
    pub timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            country_codes: "ph".to_string(),
            limit: 5,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// CSV replacing the embedded catalog.
    pub path: Option<String>,
}

/// Empty strings and placeholders whose variable was not set count as unset.
fn resolved(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}

impl AppConfig {
    /// Loads `path`, else `./filltrip.toml` when present, else defaults.
    /// `FILLTRIP_API_BASE` overrides the persistence base URL in every case.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No config file, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self = toml::from_str(&processed_content).map_err(|e| {
            FillTripError::Config {
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        config.persistence.base_url = config.persistence.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FillTripError::Config {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                tracing::debug!("{} overrides persistence.base_url", API_BASE_ENV);
                self.persistence.base_url = base.trim().trim_end_matches('/').to_string();
            }
        }
    }

    pub fn routing_token(&self) -> Option<&str> {
        resolved(&self.routing.access_token)
    }

    pub fn geocoder(&self) -> Result<NominatimClient> {
        Ok(
            NominatimClient::new(&self.geocoding.endpoint, self.geocoding.timeout_seconds)?
                .with_country_codes(&self.geocoding.country_codes)
                .with_limit(self.geocoding.limit),
        )
    }

    pub fn load_catalog(&self) -> Result<VehicleCatalog> {
        match resolved(&self.catalog.path) {
            Some(path) => VehicleCatalog::from_path(path),
            None => VehicleCatalog::embedded(),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("persistence.base_url", &self.persistence.base_url)?;
        validate_range(
            "persistence.timeout_seconds",
            self.persistence.timeout_seconds,
            1,
            300,
        )?;
        validate_url("routing.endpoint", &self.routing.endpoint)?;
        validate_range("routing.timeout_seconds", self.routing.timeout_seconds, 1, 300)?;
        validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validate_range("geocoding.limit", self.geocoding.limit, 1, 50)?;
        validate_range(
            "geocoding.timeout_seconds",
            self.geocoding.timeout_seconds,
            1,
            300,
        )?;
        self.matcher.validate()?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn api_base(&self) -> &str {
        &self.persistence.base_url
    }

    fn auth_token(&self) -> Option<&str> {
        resolved(&self.persistence.auth_token)
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.persistence.timeout_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matcher, MatcherConfig::default());
        assert_eq!(config.auth_token(), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[persistence]
base_url = "http://10.0.2.2/filltrip-db/"

[matcher]
max_results = 5
"#,
        )
        .unwrap();

        assert_eq!(config.api_base(), "http://10.0.2.2/filltrip-db");
        assert_eq!(config.request_timeout_seconds(), 10);
        assert_eq!(config.matcher.max_results, 5);
        assert_eq!(config.matcher.prefix_score, 15);
        assert_eq!(config.matcher.substring_score, 8);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("FILLTRIP_TEST_TOKEN", "abc123");
        let config = AppConfig::from_toml_str(
            r#"
[persistence]
auth_token = "${FILLTRIP_TEST_TOKEN}"

[routing]
access_token = "${FILLTRIP_TEST_UNSET_VAR}"
"#,
        )
        .unwrap();

        assert_eq!(config.auth_token(), Some("abc123"));
        assert_eq!(config.routing_token(), None);
    }

    #[test]
    fn test_geocoding_section() {
        let config = AppConfig::default();
        assert_eq!(config.geocoding.country_codes, "ph");
        assert_eq!(config.geocoding.limit, 5);
        assert!(config.geocoder().is_ok());

        let config = AppConfig::from_toml_str(
            r#"
[geocoding]
country_codes = ""
limit = 0
"#,
        )
        .unwrap();
        assert_eq!(config.geocoding.country_codes, "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = AppConfig::from_toml_str(
            r#"
[persistence]
base_url = "ftp://example.com"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str(
            r#"
[matcher]
max_results = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        assert!(AppConfig::from_toml_str("[persistence\nbase_url =").is_err());
    }

    #[test]
    fn test_from_file_and_custom_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let catalog_path = dir.path().join("catalog.csv");
        std::fs::write(
            &catalog_path,
            "id,make,model,typical_years,km_per_liter_avg,category\n\
             a,Isuzu,D-Max,2019-2023,11.0,Car\n",
        )
        .unwrap();

        let config_path = dir.path().join("filltrip.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            "[catalog]\npath = \"{}\"",
            catalog_path.to_str().unwrap().replace('\\', "/")
        )
        .unwrap();

        let config = AppConfig::from_file(&config_path).unwrap();
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].record.make, "Isuzu");
    }
}
