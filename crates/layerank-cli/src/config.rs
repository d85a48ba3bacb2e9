use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, Map};
use layerank_config::{AccessToken, RunConfig};
use layerank_launch::LaunchConfig;
use serde::{Deserialize, Serialize};

/// Environment variables consulted, in order, when no token is configured.
pub const TOKEN_ENV_VARS: [&str; 2] = ["HF_TOKEN", "HUGGING_FACE_HUB_TOKEN"];

/// Full launcher configuration: where/how to launch, and what to train.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AppConfig {
    pub launch: LaunchConfig,
    pub run: RunConfig,
}

/// Load configuration from:
/// 1. Built-in defaults (the reference run)
/// 2. `config/layerank.toml` (if present)
/// 3. A custom config file path (if provided)
/// 4. Environment variables prefixed with `LAYERANK_`
///    (`LAYERANK_RUN__OPTIM__LEARNING_RATE`, `LAYERANK_LAUNCH__WORKDIR`, …)
///
/// The access token is then injected and `~` expanded in paths.
pub fn load_config(config_file: Option<&PathBuf>) -> Result<AppConfig, ConfigError> {
    let mut cfg = load_layers(config_file, None)?;
    inject_token(&mut cfg, |key| std::env::var(key).ok());
    expand_paths(&mut cfg);
    Ok(cfg)
}

/// Layered load without post-processing.  `env` replaces the process
/// environment as the source of `LAYERANK_*` overrides when given.
fn load_layers(
    config_file: Option<&PathBuf>,
    env: Option<Map<String, String>>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        // Layer 1: defaults baked in
        .add_source(Config::try_from(&AppConfig::default())?)
        // Layer 2: project config file
        .add_source(File::with_name("config/layerank").required(false));

    // Layer 3: optional user-supplied config file
    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    // Layer 4: environment variables
    builder = builder.add_source(
        Environment::with_prefix("LAYERANK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    builder.build()?.try_deserialize()
}

/// Fill `run.storage.token` from [`TOKEN_ENV_VARS`] when the configuration
/// layers left it unset or blank.
pub fn inject_token(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if cfg.run.token().is_some() {
        return;
    }
    cfg.run.storage.token = TOKEN_ENV_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .map(AccessToken::new)
        .find(|t| !t.is_empty());
}

fn expand_paths(cfg: &mut AppConfig) {
    for p in [
        &mut cfg.launch.workdir,
        &mut cfg.launch.eval_script,
        &mut cfg.run.optim.deepspeed,
        &mut cfg.run.storage.output_dir,
        &mut cfg.run.storage.cache_dir,
        &mut cfg.run.storage.cache_path,
    ] {
        *p = expand_tilde(p);
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(raw: &Path) -> PathBuf {
    if let Ok(rest) = raw.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    raw.to_path_buf()
}
