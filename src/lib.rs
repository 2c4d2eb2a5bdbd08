pub mod audiotags;
pub mod common;
pub mod config;
pub mod deleter;
pub mod detection;
pub mod error;
pub mod metadata;
pub mod mover;
pub mod patterns;
pub mod pipeline;
pub mod renamer;
pub mod tagger;
pub mod tagging_sets;

pub use config::Config;
pub use error::{Result, VidtagError, VidtagExpectedError};
pub use pipeline::{run, MediaType, PipelineSummary, StageReport};
pub use tagging_sets::{ResourceId, TaggingSet};

#[cfg(test)]
mod testing;

#[cfg(test)]
mod audiotags_test;
#[cfg(test)]
mod common_test;
#[cfg(test)]
mod config_test;
