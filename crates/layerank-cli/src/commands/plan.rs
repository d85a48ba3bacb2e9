use layerank_launch::{Pipeline, PlannedStep, ProcessExecutor, Stage};
use serde::Serialize;
use tracing::error;

use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct PlanEntry {
    stage: Stage,
    cwd: Option<String>,
    argv: Vec<String>,
}

impl From<&PlannedStep> for PlanEntry {
    fn from(step: &PlannedStep) -> Self {
        Self {
            stage: step.stage,
            cwd: step.invocation.cwd().map(|p| p.display().to_string()),
            argv: step.invocation.redacted_argv(),
        }
    }
}

/// Print the commands a run would execute.  Nothing is spawned.
pub fn run(config: &AppConfig, json: bool) -> i32 {
    if let Err(e) = config.run.validate() {
        error!(error = %e, "Configuration is invalid");
        return 2;
    }

    let steps = Pipeline::new(&config.launch, &config.run, ProcessExecutor).plan();
    match render(&steps, json) {
        Ok(out) => {
            println!("{out}");
            0
        }
        Err(e) => {
            error!(error = %e, "Failed to render plan");
            1
        }
    }
}

fn render(steps: &[PlannedStep], json: bool) -> serde_json::Result<String> {
    if json {
        let entries: Vec<PlanEntry> = steps.iter().map(PlanEntry::from).collect();
        return serde_json::to_string_pretty(&entries);
    }
    Ok(steps
        .iter()
        .map(|s| format!("+ {}", s.invocation))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use layerank_config::AccessToken;

    use super::*;

    fn steps_with_token() -> Vec<PlannedStep> {
        let mut cfg = AppConfig::default();
        cfg.run.storage.token = Some(AccessToken::new("hf_plan_secret"));
        Pipeline::new(&cfg.launch, &cfg.run, ProcessExecutor).plan()
    }

    #[test]
    fn text_plan_lists_stages_in_order_without_secret() {
        let out = render(&steps_with_token(), false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "+ conda run -n reranker python --version");
        assert!(lines[1].contains("torchrun --nproc_per_node 8"));
        assert!(lines[1].contains("--token '***'"));
        assert!(lines[2].ends_with("bash ./scripts/evaluate.sh"));
        assert!(!out.contains("hf_plan_secret"));
    }

    #[test]
    fn json_plan_lists_stage_cwd_and_argv() {
        let out = render(&steps_with_token(), true).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        let entries = v.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1]["stage"], "train");
        assert_eq!(entries[2]["cwd"], ".");
        assert_eq!(entries[0]["cwd"], serde_json::Value::Null);
        assert!(!out.contains("hf_plan_secret"));
    }
}
