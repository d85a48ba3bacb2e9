//! String-valued selectors passed through to the training entry point.
//!
//! [`Precision`] and [`PaddingSide`] are closed sets.  [`LossType`] and
//! [`TrainMethod`] name variants owned by the external training framework, so
//! unrecognised values are carried verbatim as `Custom` and only flagged as
//! warnings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Precision ─────────────────────────────────────────────────────────────────

/// Numeric precision mode of the training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Precision {
    #[default]
    Bf16,
    Fp16,
    Fp32,
}

impl Precision {
    /// Presence flag enabling this mode, `None` for full precision.
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            Self::Bf16 => Some("--bf16"),
            Self::Fp16 => Some("--fp16"),
            Self::Fp32 => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bf16 => "bf16",
            Self::Fp16 => "fp16",
            Self::Fp32 => "fp32",
        }
    }
}

impl FromStr for Precision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bf16" => Ok(Self::Bf16),
            "fp16" => Ok(Self::Fp16),
            "fp32" => Ok(Self::Fp32),
            other => Err(ConfigError::UnknownVariant {
                kind: "precision",
                value: other.to_string(),
                expected: "bf16, fp16, fp32",
            }),
        }
    }
}

impl TryFrom<String> for Precision {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Precision> for String {
    fn from(v: Precision) -> Self {
        v.as_str().to_string()
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PaddingSide ───────────────────────────────────────────────────────────────

/// Side on which the tokenizer pads batched sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaddingSide {
    Left,
    #[default]
    Right,
}

impl PaddingSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl FromStr for PaddingSide {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ConfigError::UnknownVariant {
                kind: "padding side",
                value: other.to_string(),
                expected: "left, right",
            }),
        }
    }
}

impl TryFrom<String> for PaddingSide {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PaddingSide> for String {
    fn from(v: PaddingSide) -> Self {
        v.as_str().to_string()
    }
}

impl fmt::Display for PaddingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── LossType ──────────────────────────────────────────────────────────────────

/// Loss-function variant selector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum LossType {
    /// Score only from the final logits (`only logits`).
    #[default]
    OnlyLogits,
    Custom(String),
}

impl LossType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OnlyLogits => "only logits",
            Self::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<String> for LossType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "only logits" => Self::OnlyLogits,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for LossType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<LossType> for String {
    fn from(l: LossType) -> Self {
        l.as_str().to_string()
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TrainMethod ───────────────────────────────────────────────────────────────

/// Which distillation variant the entry point runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TrainMethod {
    /// Plain fine-tuning, no teacher signal.
    Normal,
    /// Distil every compressed configuration from the full model.
    Distill,
    /// Distil against a teacher pinned to a fixed layer.
    #[default]
    DistillFixLayerTeacher,
    Custom(String),
}

impl TrainMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "normal",
            Self::Distill => "distill",
            Self::DistillFixLayerTeacher => "distill_fix_layer_teacher",
            Self::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<String> for TrainMethod {
    fn from(s: String) -> Self {
        match s.as_str() {
            "normal" => Self::Normal,
            "distill" => Self::Distill,
            "distill_fix_layer_teacher" => Self::DistillFixLayerTeacher,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for TrainMethod {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TrainMethod> for String {
    fn from(m: TrainMethod) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for TrainMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_flags() {
        assert_eq!(Precision::Bf16.flag(), Some("--bf16"));
        assert_eq!(Precision::Fp16.flag(), Some("--fp16"));
        assert_eq!(Precision::Fp32.flag(), None);
    }

    #[test]
    fn precision_parse_rejects_unknown() {
        assert_eq!("fp16".parse::<Precision>().unwrap(), Precision::Fp16);
        let err = "int8".parse::<Precision>().unwrap_err();
        assert!(err.to_string().contains("int8"));
    }

    #[test]
    fn padding_side_is_case_sensitive() {
        assert_eq!("right".parse::<PaddingSide>().unwrap(), PaddingSide::Right);
        assert!("Right".parse::<PaddingSide>().is_err());
    }

    #[test]
    fn loss_type_keeps_spaces() {
        let l = LossType::from("only logits");
        assert_eq!(l, LossType::OnlyLogits);
        assert_eq!(l.as_str(), "only logits");
    }

    #[test]
    fn unknown_train_method_passes_through() {
        let m = TrainMethod::from("distill_auto_layer");
        assert!(m.is_custom());
        assert_eq!(m.to_string(), "distill_auto_layer");
    }

    #[test]
    fn selectors_deserialize_from_wire_strings() {
        let m: TrainMethod = serde_json::from_str("\"distill_fix_layer_teacher\"").unwrap();
        assert_eq!(m, TrainMethod::DistillFixLayerTeacher);
        let p: Precision = serde_json::from_str("\"bf16\"").unwrap();
        assert_eq!(p, Precision::Bf16);
        let s = serde_json::to_string(&LossType::OnlyLogits).unwrap();
        assert_eq!(s, "\"only logits\"");
        assert_eq!(serde_json::to_string(&PaddingSide::Left).unwrap(), "\"left\"");
    }

    #[test]
    fn unknown_closed_selector_fails_deserialization() {
        let err = serde_json::from_str::<Precision>("\"int8\"").unwrap_err();
        assert!(err.to_string().contains("unknown precision 'int8'"));
        let err = serde_json::from_str::<PaddingSide>("\"Right\"").unwrap_err();
        assert!(err.to_string().contains("Valid values: left, right"));
    }
}
