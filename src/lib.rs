pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::adapters::{http::HttpFetcher, storage::LocalStorage};
pub use crate::app::run_job;
pub use crate::config::RulesetConfig;
pub use crate::core::{engine::RulesetEngine, pipeline::RulesetPipeline};
pub use crate::utils::error::{Result, RulesetError};
