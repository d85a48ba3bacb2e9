//! The run configuration and its sections.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schedule::LayerSchedule;
use crate::secret::AccessToken;
use crate::selectors::{LossType, PaddingSide, Precision};

/// Every parameter of one training run.
///
/// Built once before launch and only borrowed afterwards; nothing in the
/// launch path holds a mutable reference to it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub topology: TopologyConfig,
    pub optim: OptimConfig,
    pub lora: LoraConfig,
    pub task: TaskConfig,
    pub schedule: LayerSchedule,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Worker processes per node.
    pub nproc_per_node: u32,
    pub nnodes: u32,
    pub per_device_train_batch_size: u32,
    pub gradient_accumulation_steps: u32,
    pub dataloader_drop_last: bool,
    pub ddp_find_unused_parameters: bool,
    pub gradient_checkpointing: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            nproc_per_node: 8,
            nnodes: 1,
            per_device_train_batch_size: 4,
            gradient_accumulation_steps: 4,
            dataloader_drop_last: true,
            ddp_find_unused_parameters: false,
            gradient_checkpointing: true,
        }
    }
}

impl TopologyConfig {
    /// Total worker processes across all nodes.
    pub fn world_size(&self) -> u64 {
        u64::from(self.nproc_per_node) * u64::from(self.nnodes)
    }

    /// Queries consumed per optimizer step across the whole job.
    ///
    /// Saturates at `u64::MAX`; every factor is a `u32`, so only absurd
    /// configurations get there.
    pub fn global_batch_size(&self) -> u64 {
        self.world_size()
            .saturating_mul(u64::from(self.per_device_train_batch_size))
            .saturating_mul(u64::from(self.gradient_accumulation_steps))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OptimConfig {
    pub learning_rate: f64,
    pub num_train_epochs: u32,
    pub warmup_ratio: f64,
    pub precision: Precision,
    /// DeepSpeed configuration file.
    pub deepspeed: PathBuf,
    pub logging_steps: u32,
}

impl Default for OptimConfig {
    fn default() -> Self {
        Self {
            learning_rate: 2e-4,
            num_train_epochs: 1,
            warmup_ratio: 0.1,
            precision: Precision::Bf16,
            deepspeed: PathBuf::from("./ds_config.json"),
            logging_steps: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoraConfig {
    pub use_lora: bool,
    pub lora_rank: u32,
    pub lora_alpha: u32,
    pub target_modules: Vec<String>,
}

impl Default for LoraConfig {
    fn default() -> Self {
        Self {
            use_lora: true,
            lora_rank: 32,
            lora_alpha: 64,
            target_modules: [
                "q_proj", "k_proj", "v_proj", "o_proj", "gate_proj", "up_proj", "down_proj",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskConfig {
    pub query_max_len: u32,
    pub passage_max_len: u32,
    /// Candidates per query: one positive plus `train_group_size - 1` negatives.
    pub train_group_size: u32,
    pub loss_type: LossType,
    pub use_flash_attn: bool,
    pub padding_side: PaddingSide,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            query_max_len: 32,
            passage_max_len: 192,
            train_group_size: 16,
            loss_type: LossType::OnlyLogits,
            use_flash_attn: false,
            padding_side: PaddingSide::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub model_name_or_path: String,
    pub train_data: String,
    /// Model/tokenizer download cache.
    pub cache_dir: PathBuf,
    /// Processed dataset cache.
    pub cache_path: PathBuf,
    pub save_steps: u32,
    pub save_total_limit: u32,
    /// Never set from a literal; injected from configuration or environment.
    pub token: Option<AccessToken>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output/layerwise-distill"),
            model_name_or_path: "mistralai/Mistral-7B-v0.1".to_string(),
            train_data: "./data/train".to_string(),
            cache_dir: PathBuf::from("./cache/model"),
            cache_path: PathBuf::from("./cache/data"),
            save_steps: 100,
            save_total_limit: 50,
            token: None,
        }
    }
}

impl RunConfig {
    /// The configured token, ignoring blank values.
    pub fn token(&self) -> Option<&AccessToken> {
        self.storage.token.as_ref().filter(|t| !t.is_empty())
    }

    /// Non-fatal observations about the configuration: selector values the
    /// launcher does not recognise and a missing access token.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.task.loss_type.is_custom() {
            out.push(format!(
                "task.loss_type '{}' is not a known loss variant; passing it through",
                self.task.loss_type
            ));
        }
        if self.schedule.train_method.is_custom() {
            out.push(format!(
                "schedule.train_method '{}' is not a known training method; passing it through",
                self.schedule.train_method
            ));
        }
        if self.token().is_none() {
            out.push(
                "no access token configured; --token will be omitted and gated \
                 models or datasets may fail to download"
                    .to_string(),
            );
        }
        out
    }
}
