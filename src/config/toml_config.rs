use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub transform: Option<TransformConfig>,
    pub load: LoadConfig,
    pub performance: Option<PerformanceConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_dir: String,
    pub skip_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Header synonym renames, old name -> canonical name. Merged on top of
    /// the built-in `Item -> Crop` entry.
    pub rename: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    /// Output filename; `{timestamp}` expands to the current UTC time.
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub concurrent_sources: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| EtlError::ConfigError {
                message: format!("cannot read config file '{}': {}", path.as_ref().display(), e),
            })?;
        let content = Self::interpolate_env_vars(&content);
        toml::from_str(&content).map_err(|e| EtlError::ConfigError {
            message: format!("invalid TOML config: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment variable's value; unknown
    /// variables are left as-is.
    fn interpolate_env_vars(content: &str) -> String {
        use regex::Regex;

        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
        re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
    }

    /// Resolves optional sections and placeholders into a flat provider.
    pub fn resolve(self) -> TomlProvider {
        let output_file = self
            .load
            .output_file
            .unwrap_or_else(|| "merged_market_data.csv".to_string())
            .replace(
                "{timestamp}",
                &chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string(),
            );

        let mut synonyms = HashMap::from([("Item".to_string(), "Crop".to_string())]);
        if let Some(transform) = self.transform {
            if let Some(rename) = transform.rename {
                synonyms.extend(rename);
            }
        }

        TomlProvider {
            input_dir: self.source.input_dir,
            skip_rows: self.source.skip_rows.unwrap_or(1),
            output_path: self.load.output_path,
            output_file,
            concurrent_sources: self
                .performance
                .and_then(|p| p.concurrent_sources)
                .unwrap_or(5),
            monitoring: self
                .monitoring
                .and_then(|m| m.enabled)
                .unwrap_or(false),
            synonyms,
        }
    }
}

/// A [`TomlConfig`] with defaults filled in, usable as a [`ConfigProvider`].
#[derive(Debug, Clone)]
pub struct TomlProvider {
    pub input_dir: String,
    pub skip_rows: usize,
    pub output_path: String,
    pub output_file: String,
    pub concurrent_sources: usize,
    pub monitoring: bool,
    pub synonyms: HashMap<String, String>,
}

impl ConfigProvider for TomlProvider {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn skip_rows(&self) -> usize {
        self.skip_rows
    }

    fn concurrent_sources(&self) -> usize {
        self.concurrent_sources
    }

    fn synonyms(&self) -> HashMap<String, String> {
        self.synonyms.clone()
    }
}

impl Validate for TomlProvider {
    fn validate(&self) -> Result<()> {
        validate_path("source.input_dir", &self.input_dir)?;
        validate_path("load.output_path", &self.output_path)?;
        validate_path("load.output_file", &self.output_file)?;
        validate_range("source.skip_rows", self.skip_rows, 0, 10)?;
        validate_positive_number(
            "performance.concurrent_sources",
            self.concurrent_sources,
            1,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[pipeline]
name = "market-merge"
description = "Merge yearly crop price sheets"
version = "1.0"

[source]
input_dir = "./raw_data"
skip_rows = 2

[transform]
rename = { Commodity = "Crop" }

[load]
output_path = "./output"
output_file = "merged_{timestamp}.csv"

[performance]
concurrent_sources = 3
"#;

    #[test]
    fn test_parse_and_resolve() {
        let config: TomlConfig = toml::from_str(SAMPLE).unwrap();
        let provider = config.resolve();

        assert_eq!(provider.input_dir, "./raw_data");
        assert_eq!(provider.skip_rows, 2);
        assert_eq!(provider.concurrent_sources, 3);
        assert!(!provider.monitoring);
        // built-in Item rename survives alongside the configured one
        assert_eq!(provider.synonyms.get("Item"), Some(&"Crop".to_string()));
        assert_eq!(
            provider.synonyms.get("Commodity"),
            Some(&"Crop".to_string())
        );
        assert!(!provider.output_file.contains("{timestamp}"));
        assert!(provider.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let minimal = r#"
[pipeline]
name = "m"
description = "d"
version = "0.1"

[source]
input_dir = "./raw_data"

[load]
output_path = "./output"
"#;
        let provider = toml::from_str::<TomlConfig>(minimal).unwrap().resolve();
        assert_eq!(provider.skip_rows, 1);
        assert_eq!(provider.output_file, "merged_market_data.csv");
        assert_eq!(provider.concurrent_sources, 5);
    }

    #[test]
    fn test_env_var_interpolation() {
        std::env::set_var("MARKET_ETL_TEST_DIR", "/tmp/prices");
        let interpolated =
            TomlConfig::interpolate_env_vars("input_dir = \"${MARKET_ETL_TEST_DIR}\"");
        assert_eq!(interpolated, "input_dir = \"/tmp/prices\"");

        let untouched = TomlConfig::interpolate_env_vars("x = \"${NO_SUCH_VAR_SET}\"");
        assert_eq!(untouched, "x = \"${NO_SUCH_VAR_SET}\"");
    }
}
