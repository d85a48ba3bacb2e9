//! Rendering of a [`RunConfig`] into the training entry point's argv.

use std::path::Path;

use crate::run::RunConfig;

/// Flag whose value is the access token.
pub const TOKEN_FLAG: &str = "--token";

impl RunConfig {
    /// Build the command-line arguments for the training entry point.
    ///
    /// Booleans the entry point parses by value render as `True`/`False`;
    /// presence flags render alone or not at all; list flags take one argv
    /// element per item.  `--token` is only emitted when a non-blank token
    /// is configured.
    pub fn to_cli_args(&self) -> Vec<String> {
        let topo = &self.topology;
        let optim = &self.optim;
        let lora = &self.lora;
        let task = &self.task;
        let sched = &self.schedule;
        let store = &self.storage;

        let mut args = vec![
            "--output_dir".into(),
            path(&store.output_dir),
            "--model_name_or_path".into(),
            store.model_name_or_path.clone(),
            "--train_data".into(),
            store.train_data.clone(),
            "--learning_rate".into(),
            format!("{:e}", optim.learning_rate),
            "--num_train_epochs".into(),
            optim.num_train_epochs.to_string(),
            "--per_device_train_batch_size".into(),
            topo.per_device_train_batch_size.to_string(),
            "--gradient_accumulation_steps".into(),
            topo.gradient_accumulation_steps.to_string(),
            "--dataloader_drop_last".into(),
            py_bool(topo.dataloader_drop_last),
            "--query_max_len".into(),
            task.query_max_len.to_string(),
            "--passage_max_len".into(),
            task.passage_max_len.to_string(),
            "--train_group_size".into(),
            task.train_group_size.to_string(),
            "--logging_steps".into(),
            optim.logging_steps.to_string(),
            "--save_steps".into(),
            store.save_steps.to_string(),
            "--save_total_limit".into(),
            store.save_total_limit.to_string(),
            "--ddp_find_unused_parameters".into(),
            py_bool(topo.ddp_find_unused_parameters),
        ];
        if topo.gradient_checkpointing {
            args.push("--gradient_checkpointing".into());
        }
        args.extend([
            "--deepspeed".into(),
            path(&optim.deepspeed),
            "--warmup_ratio".into(),
            optim.warmup_ratio.to_string(),
        ]);
        if let Some(flag) = optim.precision.flag() {
            args.push(flag.into());
        }
        args.extend([
            "--use_lora".into(),
            py_bool(lora.use_lora),
            "--lora_rank".into(),
            lora.lora_rank.to_string(),
            "--lora_alpha".into(),
            lora.lora_alpha.to_string(),
            "--loss_type".into(),
            task.loss_type.to_string(),
            "--use_flash_attn".into(),
            py_bool(task.use_flash_attn),
            "--target_modules".into(),
        ]);
        args.extend(lora.target_modules.iter().cloned());
        if let Some(token) = self.token() {
            args.extend([TOKEN_FLAG.into(), token.expose().to_string()]);
        }
        args.extend([
            "--cache_dir".into(),
            path(&store.cache_dir),
            "--cache_path".into(),
            path(&store.cache_path),
            "--padding_side".into(),
            task.padding_side.to_string(),
            "--start_layer".into(),
            sched.start_layer.to_string(),
            "--layer_sep".into(),
            sched.layer_sep.to_string(),
            "--layer_wise".into(),
            py_bool(sched.layer_wise),
            "--compress_ratios".into(),
        ]);
        args.extend(sched.compress_ratios.iter().map(u32::to_string));
        args.push("--compress_layers".into());
        args.extend(sched.compress_layers.iter().map(u32::to_string));
        args.extend(["--train_method".into(), sched.train_method.to_string()]);
        args
    }
}

fn py_bool(b: bool) -> String {
    let s = if b { "True" } else { "False" };
    s.to_string()
}

fn path(p: &Path) -> String {
    p.display().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
