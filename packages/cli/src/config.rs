use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stonecat_model::{ProductType, VariantField};

pub const DEFAULT_CONFIG_NAME: &str = "stonecat.config.json";

/// Stonecat configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Currency label printed next to prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Product type assumed for forms started from a template
    #[serde(default = "default_product_type")]
    pub product_type: ProductType,

    /// Matrices rendered by `stonecat matrix`
    #[serde(default = "default_fields")]
    pub fields: Vec<VariantField>,

    /// Undo levels kept per session (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Default tracing filter; `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_currency() -> String {
    "₽".to_string()
}

fn default_product_type() -> ProductType {
    ProductType::Matrix
}

fn default_fields() -> Vec<VariantField> {
    vec![VariantField::Price]
}

fn default_undo_levels() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            product_type: default_product_type(),
            fields: default_fields(),
            undo_levels: default_undo_levels(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "currency": "RUB",
            "productType": "SINGLE_VARIANT",
            "fields": ["price", "stock"],
            "undoLevels": 20,
            "logLevel": "debug"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.currency, "RUB");
        assert_eq!(config.product_type, ProductType::SingleVariant);
        assert_eq!(config.fields, vec![VariantField::Price, VariantField::Stock]);
        assert_eq!(config.undo_levels, 20);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "fields": ["weight"] }"#).unwrap();
        assert_eq!(config.fields, vec![VariantField::Weight]);
        assert_eq!(config.currency, "₽");
        assert_eq!(config.product_type, ProductType::Matrix);
        assert_eq!(config.undo_levels, 100);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fields, vec![VariantField::Price]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "currency": "EUR", "productType": "SIMPLE", "undoLevels": 5 }"#,
        )
        .unwrap();

        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.product_type, ProductType::Simple);
        assert_eq!(config.undo_levels, 5);
        assert_eq!(config.fields, vec![VariantField::Price]);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();
        assert!(Config::load(&dir.path().display().to_string()).is_err());
    }

    #[test]
    fn test_load_without_file() {
        let config = Config::load("/nonexistent/stonecat").unwrap();
        assert_eq!(config.undo_levels, 100);
    }
}
