use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Synonym rename entries are `Old=New` pairs, e.g. `Item=Crop`.
pub fn validate_rename_pairs(field_name: &str, pairs: &[String]) -> Result<()> {
    for pair in pairs {
        let mut parts = pair.splitn(2, '=');
        let old = parts.next().unwrap_or("");
        let new = parts.next().unwrap_or("");
        if old.trim().is_empty() || new.trim().is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: pair.clone(),
                reason: "Rename entries must have the form 'Old=New'".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input_dir", "./raw_data").is_ok());
        assert!(validate_path("input_dir", "").is_err());
        assert!(validate_path("input_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("concurrent_sources", 5, 1).is_ok());
        assert!(validate_positive_number("concurrent_sources", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("skip_rows", 1usize, 0, 10).is_ok());
        assert!(validate_range("skip_rows", 11usize, 0, 10).is_err());
    }

    #[test]
    fn test_validate_rename_pairs() {
        let pairs = vec!["Item=Crop".to_string(), "Commodity=Crop".to_string()];
        assert!(validate_rename_pairs("rename", &pairs).is_ok());

        let bad = vec!["Item".to_string()];
        assert!(validate_rename_pairs("rename", &bad).is_err());

        let empty_side = vec!["=Crop".to_string()];
        assert!(validate_rename_pairs("rename", &empty_side).is_err());
    }
}
