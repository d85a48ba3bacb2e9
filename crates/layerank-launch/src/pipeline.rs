//! The activate → enter → train → evaluate sequence.

use std::fmt;
use std::time::{Duration, Instant};

use layerank_config::RunConfig;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{LaunchError, LaunchResult};
use crate::executor::Executor;
use crate::invocation::Invocation;
use crate::launch::LaunchConfig;

// ── Stage ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Activate,
    Train,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activate => "activate",
            Self::Train => "train",
            Self::Evaluate => "evaluate",
        })
    }
}

/// One command a successful run executes, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub stage: Stage,
    pub invocation: Invocation,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub exit_code: i32,
    pub elapsed: Duration,
}

/// Outcome of a run in which every stage exited 0.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Sequential two-stage runner over a borrowed, immutable [`RunConfig`].
pub struct Pipeline<'a, E> {
    launch: &'a LaunchConfig,
    run: &'a RunConfig,
    executor: E,
}

impl<'a, E: Executor> Pipeline<'a, E> {
    pub fn new(launch: &'a LaunchConfig, run: &'a RunConfig, executor: E) -> Self {
        Self {
            launch,
            run,
            executor,
        }
    }

    /// The commands a successful run executes, in order.  Spawns nothing.
    pub fn plan(&self) -> Vec<PlannedStep> {
        let mut steps = Vec::with_capacity(3);
        if let Some(invocation) = self.launch.activation() {
            steps.push(PlannedStep {
                stage: Stage::Activate,
                invocation,
            });
        }
        steps.push(PlannedStep {
            stage: Stage::Train,
            invocation: self.launch.training(self.run),
        });
        steps.push(PlannedStep {
            stage: Stage::Evaluate,
            invocation: self.launch.evaluation(),
        });
        steps
    }

    /// Execute the run, stopping at the first failure.
    ///
    /// Evaluation starts only after training exits 0 and runs at most once.
    pub async fn run(&self) -> LaunchResult<RunSummary> {
        self.run.validate()?;

        let started = Instant::now();
        let mut summary = RunSummary::default();

        if let Some(activation) = self.launch.activation() {
            let report = self.step(Stage::Activate, &activation).await?;
            if report.exit_code != 0 {
                let env = self.launch.runtime.env_name().unwrap_or_default().to_string();
                error!(env = %env, code = report.exit_code, "Runtime environment activation failed");
                return Err(LaunchError::Activation {
                    env,
                    code: report.exit_code,
                });
            }
            summary.stages.push(report);
        }

        if !self.launch.workdir.is_dir() {
            error!(workdir = %self.launch.workdir.display(), "Working directory missing");
            return Err(LaunchError::WorkdirMissing(self.launch.workdir.clone()));
        }

        for (stage, invocation) in [
            (Stage::Train, self.launch.training(self.run)),
            (Stage::Evaluate, self.launch.evaluation()),
        ] {
            let report = self.step(stage, &invocation).await?;
            if report.exit_code != 0 {
                error!(stage = %stage, code = report.exit_code, "Stage failed, aborting run");
                return Err(LaunchError::StageFailed {
                    stage,
                    code: report.exit_code,
                });
            }
            summary.stages.push(report);
        }

        summary.elapsed = started.elapsed();
        info!(
            elapsed = format!("{:.1}s", summary.elapsed.as_secs_f64()),
            "Training and evaluation complete"
        );
        Ok(summary)
    }

    async fn step(&self, stage: Stage, invocation: &Invocation) -> LaunchResult<StageReport> {
        info!(stage = %stage, "+ {invocation}");
        let started = Instant::now();
        let exit_code = self.executor.execute(invocation).await?;
        let elapsed = started.elapsed();
        info!(
            stage = %stage,
            exit_code,
            elapsed = format!("{:.1}s", elapsed.as_secs_f64()),
            "Stage finished"
        );
        Ok(StageReport {
            stage,
            exit_code,
            elapsed,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use layerank_config::AccessToken;
    use tempfile::TempDir;

    use super::*;
    use crate::environment::RuntimeEnv;

    /// Answers each call with the next scripted exit code (0 once exhausted)
    /// and records what it was asked to run.
    #[derive(Default)]
    struct ScriptedExecutor {
        codes: Mutex<VecDeque<i32>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedExecutor {
        fn with_codes(codes: &[i32]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().copied().collect()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Executor for ScriptedExecutor {
        async fn execute(&self, invocation: &Invocation) -> LaunchResult<i32> {
            self.calls.lock().unwrap().push(invocation.clone());
            Ok(self.codes.lock().unwrap().pop_front().unwrap_or(0))
        }
    }

    fn fixture() -> (TempDir, LaunchConfig, RunConfig) {
        let dir = tempfile::tempdir().unwrap();
        let launch = LaunchConfig {
            runtime: RuntimeEnv::named("reranker"),
            workdir: dir.path().to_path_buf(),
            ..LaunchConfig::default()
        };
        let mut run = RunConfig::default();
        run.storage.output_dir = dir.path().join("output");
        run.storage.token = Some(AccessToken::new("hf_fixture"));
        (dir, launch, run)
    }

    #[tokio::test]
    async fn success_runs_each_stage_once_in_order() {
        let (_dir, launch, run) = fixture();
        let exec = ScriptedExecutor::default();
        let summary = Pipeline::new(&launch, &run, &exec).run().await.unwrap();

        let stages: Vec<Stage> = summary.stages.iter().map(|r| r.stage).collect();
        assert_eq!(stages, [Stage::Activate, Stage::Train, Stage::Evaluate]);

        let calls = exec.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2], launch.evaluation());
        assert_eq!(calls[2].get_args().last().unwrap(), "./scripts/evaluate.sh");
    }

    #[tokio::test]
    async fn training_receives_full_run_argv() {
        let (_dir, launch, run) = fixture();
        let exec = ScriptedExecutor::default();
        Pipeline::new(&launch, &run, &exec).run().await.unwrap();

        let train = &exec.calls()[1];
        assert!(train.get_args().ends_with(&run.to_cli_args()));
        assert!(train.get_args().iter().any(|a| a == "hf_fixture"));
    }

    #[tokio::test]
    async fn activation_failure_short_circuits() {
        let (dir, launch, run) = fixture();
        let exec = ScriptedExecutor::with_codes(&[4]);
        let err = Pipeline::new(&launch, &run, &exec).run().await.unwrap_err();

        assert!(matches!(err, LaunchError::Activation { code: 4, .. }));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(exec.calls().len(), 1, "train and evaluate never executed");
        assert!(!dir.path().join("output").exists());
    }

    #[tokio::test]
    async fn training_failure_skips_evaluation() {
        let (_dir, launch, run) = fixture();
        let exec = ScriptedExecutor::with_codes(&[0, 137]);
        let err = Pipeline::new(&launch, &run, &exec).run().await.unwrap_err();

        assert!(matches!(
            err,
            LaunchError::StageFailed {
                stage: Stage::Train,
                code: 137
            }
        ));
        assert_eq!(err.exit_code(), 137);
        assert_eq!(exec.calls().len(), 2);
    }

    #[tokio::test]
    async fn evaluation_failure_is_final_exit_code() {
        let (_dir, launch, run) = fixture();
        let exec = ScriptedExecutor::with_codes(&[0, 0, 5]);
        let err = Pipeline::new(&launch, &run, &exec).run().await.unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert_eq!(exec.calls().len(), 3);
    }

    #[tokio::test]
    async fn missing_workdir_spawns_nothing_after_activation() {
        let (_dir, mut launch, run) = fixture();
        launch.workdir = PathBuf::from("/definitely/not/a/project/dir");
        let exec = ScriptedExecutor::default();
        let err = Pipeline::new(&launch, &run, &exec).run().await.unwrap_err();

        assert!(matches!(err, LaunchError::WorkdirMissing(_)));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(exec.calls().len(), 1);
    }

    #[tokio::test]
    async fn invalid_config_spawns_nothing() {
        let (_dir, launch, mut run) = fixture();
        run.schedule.compress_layers = vec![8, 4];
        let exec = ScriptedExecutor::default();
        let err = Pipeline::new(&launch, &run, &exec).run().await.unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(exec.calls().is_empty());
    }

    #[tokio::test]
    async fn no_environment_skips_activation() {
        let (_dir, mut launch, run) = fixture();
        launch.runtime = RuntimeEnv::inherit();
        let exec = ScriptedExecutor::default();
        let summary = Pipeline::new(&launch, &run, &exec).run().await.unwrap();

        assert_eq!(summary.stages.len(), 2);
        assert_eq!(exec.calls()[0].program(), "torchrun");
    }

    #[test]
    fn plan_is_deterministic_and_matches_execution_order() {
        let (_dir, launch, run) = fixture();
        let exec = ScriptedExecutor::default();
        let first = Pipeline::new(&launch, &run, &exec).plan();
        let second = Pipeline::new(&launch, &run, &exec).plan();

        assert_eq!(first, second);
        let stages: Vec<Stage> = first.iter().map(|s| s.stage).collect();
        assert_eq!(stages, [Stage::Activate, Stage::Train, Stage::Evaluate]);
        assert!(exec.calls().is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_issue_identical_invocations() {
        let (_dir, launch, run) = fixture();
        let a = ScriptedExecutor::default();
        let b = ScriptedExecutor::default();
        Pipeline::new(&launch, &run, &a).run().await.unwrap();
        Pipeline::new(&launch, &run, &b).run().await.unwrap();
        assert_eq!(a.calls(), b.calls());
    }
}
