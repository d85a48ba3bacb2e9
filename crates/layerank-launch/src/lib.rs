//! # layerank-launch
//!
//! Runs one training job and, only if it succeeds, its evaluation script.
//!
//! The sequence is strictly linear:
//!
//! 1. **Activate**: probe the conda environment (skipped when none is set).
//! 2. **Enter**: require the working directory to exist.
//! 3. **Train**: `torchrun --nproc_per_node <n> -m <entry> <run args…>`.
//! 4. **Evaluate**: `bash <eval script>`, no arguments.
//!
//! The first failing step aborts the run and its exit code becomes the
//! launcher's.  Process spawning sits behind the [`Executor`] trait so the
//! gating can be exercised without real children.
//!
//! ```rust,no_run
//! use layerank_config::RunConfig;
//! use layerank_launch::{LaunchConfig, Pipeline, ProcessExecutor};
//!
//! # async fn demo() -> layerank_launch::LaunchResult<()> {
//! let launch = LaunchConfig::default();
//! let run = RunConfig::default();
//! let summary = Pipeline::new(&launch, &run, ProcessExecutor).run().await?;
//! println!("finished {} stages", summary.stages.len());
//! # Ok(())
//! # }
//! ```

pub mod environment;
pub mod error;
pub mod executor;
pub mod invocation;
pub mod launch;
pub mod pipeline;

pub use environment::RuntimeEnv;
pub use error::{LaunchError, LaunchResult};
pub use executor::{Executor, ProcessExecutor};
pub use invocation::Invocation;
pub use launch::LaunchConfig;
pub use pipeline::{Pipeline, PlannedStep, RunSummary, Stage, StageReport};
