pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use app::run_job;
pub use config::{toml_config::TomlConfig, Job, OutputSettings};
pub use core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
