//! A single child-process command line.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use layerank_config::secret::REDACTED;

/// Program, arguments, working directory and extra environment of one
/// child process.
///
/// Arguments can be marked secret; they are passed to the child verbatim but
/// replaced by `***` in every rendering meant for humans (`Display`,
/// `Debug`, [`Invocation::redacted_argv`]).  `Debug` lists only the keys of
/// the extra environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    secret: BTreeSet<usize>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            secret: BTreeSet::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Mark the argument following every occurrence of `flag` as secret.
    pub fn secret_value_of(mut self, flag: &str) -> Self {
        let hits: Vec<usize> = self
            .args
            .iter()
            .enumerate()
            .filter(|(i, a)| *a == flag && i + 1 < self.args.len())
            .map(|(i, _)| i + 1)
            .collect();
        self.secret.extend(hits);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    pub fn is_secret(&self, index: usize) -> bool {
        self.secret.contains(&index)
    }

    /// Program followed by arguments, secrets replaced by `***`.
    pub fn redacted_argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().enumerate().map(|(i, a)| {
                if self.is_secret(i) {
                    REDACTED.to_string()
                } else {
                    a.clone()
                }
            }))
            .collect()
    }

    /// Re-home this invocation as the tail of `program prefix…`, e.g. to run
    /// it inside a runtime environment.  Secret markers, working directory
    /// and environment carry over.
    pub fn nest_under<I, S>(self, program: impl Into<String>, prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = prefix.into_iter().map(Into::into).collect();
        args.push(self.program);
        let shift = args.len();
        args.extend(self.args);
        Self {
            program: program.into(),
            args,
            cwd: self.cwd,
            envs: self.envs,
            secret: self.secret.into_iter().map(|i| i + shift).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    /// Shell-quoted, redacted command line (the `set -x` echo).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.redacted_argv();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&shell_quote(word))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("argv", &self.redacted_argv())
            .field("cwd", &self.cwd)
            .field("env_keys", &self.envs.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
