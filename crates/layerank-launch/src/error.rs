use std::io;
use std::path::PathBuf;

use layerank_config::ConfigError;
use thiserror::Error;

use crate::pipeline::Stage;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("runtime environment '{env}' could not be activated (exit code {code})")]
    Activation { env: String, code: i32 },

    #[error("working directory does not exist: {}", .0.display())]
    WorkdirMissing(PathBuf),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{stage} stage exited with code {code}")]
    StageFailed { stage: Stage, code: i32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LaunchError {
    /// Process exit code the launcher terminates with for this error.
    ///
    /// Child failures propagate the child's code; the rest follow shell
    /// conventions (127 not found, 126 not executable, 2 usage).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Activation { code, .. } | Self::StageFailed { code, .. } => *code,
            Self::WorkdirMissing(_) => 1,
            Self::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            Self::Config(_) => 2,
        }
    }
}

pub type LaunchResult<T> = Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_codes_propagate() {
        let e = LaunchError::Activation { env: "reranker".into(), code: 3 };
        assert_eq!(e.exit_code(), 3);
        let e = LaunchError::StageFailed { stage: Stage::Train, code: 137 };
        assert_eq!(e.exit_code(), 137);
        assert_eq!(e.to_string(), "train stage exited with code 137");
    }

    #[test]
    fn spawn_errors_follow_shell_conventions() {
        let spawn = |kind| LaunchError::Spawn {
            program: "torchrun".into(),
            source: io::Error::from(kind),
        };
        assert_eq!(spawn(io::ErrorKind::NotFound).exit_code(), 127);
        assert_eq!(spawn(io::ErrorKind::PermissionDenied).exit_code(), 126);
        assert_eq!(spawn(io::ErrorKind::Other).exit_code(), 1);
    }

    #[test]
    fn missing_workdir_exits_one() {
        let e = LaunchError::WorkdirMissing(PathBuf::from("/nope"));
        assert_eq!(e.exit_code(), 1);
        assert!(e.to_string().contains("/nope"));
    }

    #[test]
    fn invalid_config_exits_two() {
        let e = LaunchError::from(ConfigError::Invalid(Vec::new()));
        assert_eq!(e.exit_code(), 2);
    }
}
