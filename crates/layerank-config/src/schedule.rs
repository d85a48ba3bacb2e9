//! Layer-compression schedule.
//!
//! The reranker scores candidates from several intermediate layers
//! (`layer_wise`), starting at `start_layer` and every `layer_sep` layers
//! after it.  Within the layers listed in `compress_layers` the passage
//! tokens are pooled by one of the `compress_ratios`, so a single trained
//! model serves every (depth, ratio) pair.

use serde::{Deserialize, Serialize};

use crate::selectors::TrainMethod;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayerSchedule {
    /// First layer whose hidden state produces a score.
    pub start_layer: u32,
    /// Stride between scoring layers.
    pub layer_sep: u32,
    /// Score from every layer of the schedule instead of only the last one.
    pub layer_wise: bool,
    /// Token compression ratios, ascending; `1` means uncompressed.
    pub compress_ratios: Vec<u32>,
    /// Layers at which compression is applied, ascending.
    pub compress_layers: Vec<u32>,
    pub train_method: TrainMethod,
}

impl Default for LayerSchedule {
    fn default() -> Self {
        Self {
            start_layer: 4,
            layer_sep: 1,
            layer_wise: true,
            compress_ratios: vec![1, 2, 4, 8],
            compress_layers: vec![4, 8, 12, 16, 20, 24, 28],
            train_method: TrainMethod::DistillFixLayerTeacher,
        }
    }
}

impl LayerSchedule {
    /// Whether `layer` is reached from `start_layer` by whole strides.
    pub fn on_stride(&self, layer: u32) -> bool {
        if layer < self.start_layer || self.layer_sep == 0 {
            return false;
        }
        (layer - self.start_layer) % self.layer_sep == 0
    }

    /// Number of (layer, ratio) configurations the trained model serves.
    pub fn configurations(&self) -> usize {
        self.compress_layers.len() * self.compress_ratios.len()
    }
}
