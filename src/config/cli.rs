use crate::core::{SourceCollection, Storage};
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::path::Path;

/// Directory of input CSVs on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalCollection {
    root: String,
}

impl LocalCollection {
    pub fn new(root: String) -> Self {
        Self { root }
    }
}

impl SourceCollection for LocalCollection {
    async fn list_sources(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| EtlError::DiscoveryError {
            path: self.root.clone(),
            message: e.to_string(),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EtlError::DiscoveryError {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.to_ascii_lowercase().ends_with(".csv") {
                names.push(name);
            }
        }

        // 排序讓每次執行的處理順序一致
        names.sort();
        Ok(names)
    }

    async fn read_source(&self, name: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.root).join(name);
        let data = fs::read(full_path)?;
        Ok(data)
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
