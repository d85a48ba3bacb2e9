//! # layerank-config
//!
//! Typed run configuration for layer-wise reranker distillation.
//!
//! A [`RunConfig`] holds every hyperparameter handed to the training entry
//! point, grouped by concern:
//!
//! | Section | Covers |
//! |---------|--------|
//! | [`TopologyConfig`] | worker count, per-device batch, accumulation |
//! | [`OptimConfig`]    | learning rate, epochs, warmup, precision, DeepSpeed |
//! | [`LoraConfig`]     | adapter toggle, rank, alpha, target modules |
//! | [`TaskConfig`]     | sequence lengths, group size, loss, padding |
//! | [`LayerSchedule`]  | start layer, stride, compression ratios/layers |
//! | [`StorageConfig`]  | output/model/data locations, checkpoints, token |
//!
//! `RunConfig::default()` is the reference run.  [`RunConfig::to_cli_args`]
//! renders it into the exact argument vector the entry point expects:
//!
//! ```rust
//! use layerank_config::RunConfig;
//!
//! let cfg = RunConfig::default();
//! cfg.validate().unwrap();
//! let args = cfg.to_cli_args();
//! assert_eq!(&args[..2], ["--output_dir", "./output/layerwise-distill"]);
//! ```

pub mod error;
pub mod run;
pub mod schedule;
pub mod secret;
pub mod selectors;

mod args;
mod validate;

pub use args::TOKEN_FLAG;
pub use error::{ConfigError, ConfigResult, Violation};
pub use run::{
    LoraConfig, OptimConfig, RunConfig, StorageConfig, TaskConfig, TopologyConfig,
};
pub use schedule::LayerSchedule;
pub use secret::AccessToken;
pub use selectors::{LossType, PaddingSide, Precision, TrainMethod};
