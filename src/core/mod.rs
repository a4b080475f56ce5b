pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{LongRecord, RawTable, SourceFile, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SourceCollection, Storage};
pub use crate::utils::error::Result;
