use thiserror::Error;

/// Run-fatal errors. Per-source problems are [`SourceSkip`] instead and never
/// abort the run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Discovery error: cannot access input collection '{path}': {message}")]
    DiscoveryError { path: String, message: String },

    #[error("No records produced from any source")]
    EmptyResult,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::CsvError(_) | EtlError::IoError(_) | EtlError::DiscoveryError { .. } => {
                ErrorCategory::Io
            }
            EtlError::EmptyResult | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorSeverity::High,
            EtlError::EmptyResult => ErrorSeverity::High,
            EtlError::DiscoveryError { .. } | EtlError::ProcessingError { .. } => {
                ErrorSeverity::Critical
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DiscoveryError { path, .. } => {
                format!("Input folder '{}' does not exist or cannot be read", path)
            }
            EtlError::EmptyResult => {
                "No usable price records were found in any input file".to_string()
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            EtlError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::DiscoveryError { .. } => {
                "Check the --input-dir path (or [source].input_dir in the TOML config)".to_string()
            }
            EtlError::EmptyResult => {
                "Check that the input files end in '<name> - <year>.csv' and contain a Crop/Item column plus month columns".to_string()
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check file permissions and that the output directory is writable".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Run with --help to see valid configuration options".to_string()
            }
            EtlError::ProcessingError { .. } => {
                "This is a bug in the pipeline; please report it".to_string()
            }
        }
    }
}

/// Per-source recoverable conditions: the source is skipped with a
/// diagnostic, processing continues with the next source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceSkip {
    #[error("could not detect year in '{identifier}'")]
    YearExtraction { identifier: String },

    #[error("failed to load table: {reason}")]
    Load { reason: String },

    #[error("no 'Crop' column found")]
    SchemaRejected,
}

pub type Result<T> = std::result::Result<T, EtlError>;
