//! Pre-launch validation of a [`RunConfig`].
//!
//! Every rule is checked and all violations are reported together, so a bad
//! configuration file can be fixed in one pass.

use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult, Violation};
use crate::run::RunConfig;

impl RunConfig {
    /// Check the configuration before anything is spawned.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut v = Vec::new();
        self.check_topology(&mut v);
        self.check_optim(&mut v);
        self.check_lora(&mut v);
        self.check_task(&mut v);
        self.check_schedule(&mut v);
        self.check_storage(&mut v);

        if v.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(v))
        }
    }

    fn check_topology(&self, v: &mut Vec<Violation>) {
        let t = &self.topology;
        at_least_one(v, "topology.nproc_per_node", t.nproc_per_node);
        at_least_one(v, "topology.nnodes", t.nnodes);
        at_least_one(v, "topology.per_device_train_batch_size", t.per_device_train_batch_size);
        at_least_one(v, "topology.gradient_accumulation_steps", t.gradient_accumulation_steps);
    }

    fn check_optim(&self, v: &mut Vec<Violation>) {
        let o = &self.optim;
        if !(o.learning_rate.is_finite() && o.learning_rate > 0.0) {
            v.push(Violation::new(
                "optim.learning_rate",
                format!("must be a positive finite number, got {}", o.learning_rate),
            ));
        }
        at_least_one(v, "optim.num_train_epochs", o.num_train_epochs);
        if !(0.0..1.0).contains(&o.warmup_ratio) {
            v.push(Violation::new(
                "optim.warmup_ratio",
                format!("must be in [0, 1), got {}", o.warmup_ratio),
            ));
        }
        at_least_one(v, "optim.logging_steps", o.logging_steps);
        if o.deepspeed.as_os_str().is_empty() {
            v.push(Violation::new("optim.deepspeed", "must not be empty"));
        }
    }

    fn check_lora(&self, v: &mut Vec<Violation>) {
        let l = &self.lora;
        if !l.use_lora {
            return;
        }
        at_least_one(v, "lora.lora_rank", l.lora_rank);
        at_least_one(v, "lora.lora_alpha", l.lora_alpha);
        if l.target_modules.is_empty() {
            v.push(Violation::new(
                "lora.target_modules",
                "at least one module is required when use_lora is enabled",
            ));
        }
        let mut seen = HashSet::new();
        for m in &l.target_modules {
            if m.trim().is_empty() {
                v.push(Violation::new("lora.target_modules", "contains an empty module name"));
            } else if !seen.insert(m.as_str()) {
                v.push(Violation::new(
                    "lora.target_modules",
                    format!("module '{m}' is listed twice"),
                ));
            }
        }
    }

    fn check_task(&self, v: &mut Vec<Violation>) {
        let t = &self.task;
        at_least_one(v, "task.query_max_len", t.query_max_len);
        at_least_one(v, "task.passage_max_len", t.passage_max_len);
        if t.train_group_size < 2 {
            v.push(Violation::new(
                "task.train_group_size",
                format!(
                    "needs one positive and at least one negative (>= 2), got {}",
                    t.train_group_size
                ),
            ));
        }
        if t.loss_type.as_str().trim().is_empty() {
            v.push(Violation::new("task.loss_type", "must not be empty"));
        }
    }

    fn check_schedule(&self, v: &mut Vec<Violation>) {
        let s = &self.schedule;
        at_least_one(v, "schedule.layer_sep", s.layer_sep);

        if s.compress_ratios.is_empty() {
            v.push(Violation::new("schedule.compress_ratios", "must not be empty"));
        }
        if s.compress_ratios.contains(&0) {
            v.push(Violation::new("schedule.compress_ratios", "ratios must be >= 1"));
        }
        if !strictly_increasing(&s.compress_ratios) {
            v.push(Violation::new(
                "schedule.compress_ratios",
                format!("must be strictly increasing, got {:?}", s.compress_ratios),
            ));
        }

        if s.compress_layers.is_empty() {
            v.push(Violation::new("schedule.compress_layers", "must not be empty"));
        }
        if !strictly_increasing(&s.compress_layers) {
            v.push(Violation::new(
                "schedule.compress_layers",
                format!("must be strictly increasing, got {:?}", s.compress_layers),
            ));
        }
        for &layer in &s.compress_layers {
            if layer < s.start_layer {
                v.push(Violation::new(
                    "schedule.compress_layers",
                    format!("layer {layer} is below start_layer {}", s.start_layer),
                ));
            } else if s.layer_wise && s.layer_sep > 0 && !s.on_stride(layer) {
                v.push(Violation::new(
                    "schedule.compress_layers",
                    format!(
                        "layer {layer} is not reachable from start_layer {} with layer_sep {}",
                        s.start_layer, s.layer_sep
                    ),
                ));
            }
        }

        if s.train_method.as_str().trim().is_empty() {
            v.push(Violation::new("schedule.train_method", "must not be empty"));
        }
    }

    fn check_storage(&self, v: &mut Vec<Violation>) {
        let s = &self.storage;
        if s.output_dir.as_os_str().is_empty() {
            v.push(Violation::new("storage.output_dir", "must not be empty"));
        }
        if s.model_name_or_path.trim().is_empty() {
            v.push(Violation::new("storage.model_name_or_path", "must not be empty"));
        }
        if s.train_data.trim().is_empty() {
            v.push(Violation::new("storage.train_data", "must not be empty"));
        }
        at_least_one(v, "storage.save_steps", s.save_steps);
        at_least_one(v, "storage.save_total_limit", s.save_total_limit);
    }
}

fn at_least_one(v: &mut Vec<Violation>, field: &'static str, value: u32) {
    if value == 0 {
        v.push(Violation::new(field, "must be >= 1"));
    }
}

fn strictly_increasing(values: &[u32]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
