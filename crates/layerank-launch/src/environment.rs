//! Isolated runtime environment (conda).
//!
//! A child cannot inherit an "activated" environment from its parent the way
//! a shell session does, so activation is expressed as a probe run inside the
//! environment, and every later command is wrapped with
//! `conda run --no-capture-output -n <env>`.

use serde::{Deserialize, Serialize};

use crate::invocation::Invocation;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeEnv {
    /// conda (or mamba/micromamba) executable.
    pub conda_exe: String,
    /// Environment name; `None` runs everything in the launcher's own
    /// environment.
    pub name: Option<String>,
    /// Command run inside the environment to prove it can be activated.
    pub probe: Vec<String>,
}

impl Default for RuntimeEnv {
    fn default() -> Self {
        Self {
            conda_exe: "conda".to_string(),
            name: Some("reranker".to_string()),
            probe: vec!["python".to_string(), "--version".to_string()],
        }
    }
}

impl RuntimeEnv {
    /// Run the launcher's commands in its own environment.
    pub fn inherit() -> Self {
        Self {
            name: None,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Environment name, ignoring blank values.
    pub fn env_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// The activation probe, or `None` when no environment is configured.
    pub fn activation(&self) -> Option<Invocation> {
        let name = self.env_name()?;
        let (program, rest) = match self.probe.split_first() {
            Some((p, rest)) => (p.as_str(), rest),
            None => ("true", &[][..]),
        };
        Some(
            Invocation::new(&self.conda_exe)
                .args(["run", "-n", name, program])
                .args(rest.iter().cloned()),
        )
    }

    /// Rewrite `invocation` to execute inside this environment.
    pub fn wrap(&self, invocation: Invocation) -> Invocation {
        match self.env_name() {
            Some(name) => invocation.nest_under(
                self.conda_exe.clone(),
                ["run", "--no-capture-output", "-n", name],
            ),
            None => invocation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_probes_inside_named_env() {
        let act = RuntimeEnv::named("reranker").activation().unwrap();
        assert_eq!(act.to_string(), "conda run -n reranker python --version");
    }

    #[test]
    fn empty_probe_falls_back_to_true() {
        let env = RuntimeEnv {
            probe: Vec::new(),
            ..RuntimeEnv::named("x")
        };
        assert_eq!(env.activation().unwrap().to_string(), "conda run -n x true");
    }

    #[test]
    fn no_env_means_no_activation_and_no_wrapping() {
        let env = RuntimeEnv::inherit();
        assert!(env.activation().is_none());
        let inv = Invocation::new("bash").arg("eval.sh");
        assert_eq!(env.wrap(inv.clone()), inv);
    }

    #[test]
    fn blank_name_treated_as_unset() {
        let env = RuntimeEnv::named("  ");
        assert!(env.env_name().is_none());
        assert!(env.activation().is_none());
    }

    #[test]
    fn wrap_prefixes_conda_run() {
        let inv = RuntimeEnv::named("reranker").wrap(Invocation::new("bash").arg("eval.sh"));
        assert_eq!(
            inv.to_string(),
            "conda run --no-capture-output -n reranker bash eval.sh"
        );
    }
}
