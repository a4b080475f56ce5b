use crate::domain::model::{SourceFile, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A logical collection of input tables (a directory, in the CLI case).
pub trait SourceCollection: Send + Sync {
    /// Enumerate source identifiers, sorted for deterministic runs.
    /// Fails only when the collection root itself is inaccessible.
    fn list_sources(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    fn read_source(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    /// Leading metadata rows to skip before the header row.
    fn skip_rows(&self) -> usize;
    fn concurrent_sources(&self) -> usize;
    /// Header synonym rename table, e.g. `Item -> Crop`.
    fn synonyms(&self) -> HashMap<String, String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SourceFile>>;
    async fn transform(&self, sources: Vec<SourceFile>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
