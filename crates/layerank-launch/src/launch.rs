//! Where and how the two stages are launched.

use std::path::PathBuf;

use layerank_config::{RunConfig, TOKEN_FLAG};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::environment::RuntimeEnv;
use crate::invocation::Invocation;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub runtime: RuntimeEnv,
    /// Project directory both stages run in.
    pub workdir: PathBuf,
    /// Distributed launcher executable.
    pub launcher: String,
    /// Python module the launcher runs on every worker (`-m`).
    pub entry_module: String,
    /// Interpreter for the evaluation script.
    pub eval_shell: String,
    pub eval_script: PathBuf,
    /// Extra `KEY=VALUE` environment variables for both stages.
    pub env: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeEnv::default(),
            workdir: PathBuf::from("."),
            launcher: "torchrun".to_string(),
            entry_module: "finetune.run".to_string(),
            eval_shell: "bash".to_string(),
            eval_script: PathBuf::from("./scripts/evaluate.sh"),
            env: Vec::new(),
        }
    }
}

impl LaunchConfig {
    /// Environment activation probe; `None` when no environment is set.
    pub fn activation(&self) -> Option<Invocation> {
        self.runtime.activation()
    }

    /// `torchrun --nproc_per_node <n> --nnodes <m> -m <entry> <run args…>`
    pub fn training(&self, run: &RunConfig) -> Invocation {
        let topo = &run.topology;
        let inv = Invocation::new(&self.launcher)
            .args([
                "--nproc_per_node".to_string(),
                topo.nproc_per_node.to_string(),
                "--nnodes".to_string(),
                topo.nnodes.to_string(),
                "-m".to_string(),
                self.entry_module.clone(),
            ])
            .args(run.to_cli_args())
            .secret_value_of(TOKEN_FLAG);
        self.runtime.wrap(self.in_workdir(inv))
    }

    /// `bash <eval script>`; the script itself receives no arguments.
    pub fn evaluation(&self) -> Invocation {
        let inv = Invocation::new(&self.eval_shell).arg(self.eval_script.display().to_string());
        self.runtime.wrap(self.in_workdir(inv))
    }

    fn in_workdir(&self, inv: Invocation) -> Invocation {
        self.env_pairs()
            .fold(inv.current_dir(&self.workdir), |inv, (k, v)| inv.env(k, v))
    }

    /// Well-formed `KEY=VALUE` entries of [`LaunchConfig::env`].
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().filter_map(|entry| match entry.split_once('=') {
            Some((k, v)) if !k.is_empty() => Some((k, v)),
            _ => {
                warn!(entry = %entry, "Ignoring malformed env entry, expected KEY=VALUE");
                None
            }
        })
    }
}
