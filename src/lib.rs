pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fetch;
pub mod graph;
pub mod infra;
pub mod matching;
pub mod pipeline;
pub mod services;

pub use error::{PipelineError, PipelineResult};
