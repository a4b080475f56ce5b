pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_rename_pairs, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::collections::HashMap;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "market-etl")]
#[command(about = "Merges yearly wide-format crop price CSVs into one long-format dataset")]
pub struct CliConfig {
    #[arg(long, default_value = "./raw_data")]
    pub input_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "merged_market_data.csv")]
    pub output_file: String,

    #[arg(long, default_value = "1", help = "Metadata rows above the header row")]
    pub skip_rows: usize,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Item=Crop",
        help = "Header synonym renames as Old=New pairs"
    )]
    pub rename: Vec<String>,

    #[arg(long, default_value = "5")]
    pub concurrent_sources: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
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
        self.rename
            .iter()
            .filter_map(|pair| {
                pair.split_once('=')
                    .map(|(old, new)| (old.trim().to_string(), new.trim().to_string()))
            })
            .collect()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_dir", &self.input_dir)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("output_file", &self.output_file)?;
        validate_range("skip_rows", self.skip_rows, 0, 10)?;
        validate_positive_number("concurrent_sources", self.concurrent_sources, 1)?;
        validate_rename_pairs("rename", &self.rename)?;
        Ok(())
    }
}
