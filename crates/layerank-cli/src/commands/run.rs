use layerank_launch::{Pipeline, ProcessExecutor};
use tracing::{error, info, warn};

use crate::config::AppConfig;

/// Execute the pipeline; the return value is the launcher's exit code.
pub async fn run(config: &AppConfig) -> i32 {
    for warning in config.run.warnings() {
        warn!("{warning}");
    }

    info!(
        workers = config.run.topology.world_size(),
        output = %config.run.storage.output_dir.display(),
        method = %config.run.schedule.train_method,
        "Starting training run"
    );

    match Pipeline::new(&config.launch, &config.run, ProcessExecutor).run().await {
        Ok(summary) => {
            println!(
                "\nRun complete!\n\
                 Output: {}\n\
                 Elapsed: {:.1} s",
                config.run.storage.output_dir.display(),
                summary.elapsed.as_secs_f64(),
            );
            0
        }
        Err(e) => {
            let code = e.exit_code();
            error!(error = %e, exit_code = code, "Run aborted");
            code
        }
    }
}
