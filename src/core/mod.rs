pub mod engine;
pub mod filter;
pub mod merge;
pub mod mirror;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{FetchedDocument, RenderedFile, TransformResult};
pub use crate::domain::ports::{
    ConfigProvider, FetchFailurePolicy, Pipeline, SourceFetcher, Storage, UnknownLinePolicy,
};
pub use crate::utils::error::Result;
