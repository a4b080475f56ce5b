pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::{LocalCollection, LocalStorage};
pub use config::toml_config::{TomlConfig, TomlProvider};

pub use core::{etl::EtlEngine, pipeline::MergePipeline};
pub use utils::error::{EtlError, Result, SourceSkip};
