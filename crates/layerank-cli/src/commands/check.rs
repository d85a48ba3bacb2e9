use layerank_config::RunConfig;
use tracing::warn;

use crate::config::AppConfig;

/// Validate and summarise the resolved configuration.
pub fn run(config: &AppConfig) -> i32 {
    let (report, code) = report(&config.run);
    for warning in config.run.warnings() {
        warn!("{warning}");
    }
    println!("{report}");
    code
}

fn report(run: &RunConfig) -> (String, i32) {
    match run.validate() {
        Ok(()) => {
            let topo = &run.topology;
            let sched = &run.schedule;
            let text = format!(
                "configuration OK\n\
                 workers: {} ({} per node x {} node(s))\n\
                 global batch: {} queries x {} candidates\n\
                 compression: {} layer(s) x {} ratio(s) = {} configurations\n\
                 method: {}",
                topo.world_size(),
                topo.nproc_per_node,
                topo.nnodes,
                topo.global_batch_size(),
                run.task.train_group_size,
                sched.compress_layers.len(),
                sched.compress_ratios.len(),
                sched.configurations(),
                sched.train_method,
            );
            (text, 0)
        }
        Err(e) => {
            let lines: Vec<String> = e.violations().iter().map(|v| format!("  - {v}")).collect();
            (format!("configuration invalid:\n{}", lines.join("\n")), 2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_reports_ok() {
        let (text, code) = report(&RunConfig::default());
        assert_eq!(code, 0);
        assert!(text.starts_with("configuration OK"));
        assert!(text.contains("workers: 8 (8 per node x 1 node(s))"));
        assert!(text.contains("global batch: 128 queries x 16 candidates"));
        assert!(text.contains("= 28 configurations"));
    }

    #[test]
    fn violations_listed_one_per_line() {
        let mut run = RunConfig::default();
        run.lora.lora_alpha = 0;
        run.storage.save_total_limit = 0;
        let (text, code) = report(&run);
        assert_eq!(code, 2);
        assert!(text.contains("  - lora.lora_alpha: must be >= 1"));
        assert!(text.contains("  - storage.save_total_limit: must be >= 1"));
    }

    #[test]
    fn large_batch_reports_exact_global_batch() {
        let mut run = RunConfig::default();
        run.topology.per_device_train_batch_size = 1 << 16;
        run.topology.gradient_accumulation_steps = 1 << 16;
        let (text, code) = report(&run);
        assert_eq!(code, 0);
        assert!(text.contains("global batch: 34359738368 queries"));
    }
}
