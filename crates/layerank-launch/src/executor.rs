//! Process execution seam.

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::error::{LaunchError, LaunchResult};
use crate::invocation::Invocation;

/// Runs an [`Invocation`] to completion and reports its exit code.
///
/// `Err` is reserved for failures to start the process at all; a child that
/// runs and fails is `Ok(non_zero)`.
#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn execute(&self, invocation: &Invocation) -> LaunchResult<i32>;
}

impl<T: Executor + ?Sized> Executor for &T {
    async fn execute(&self, invocation: &Invocation) -> LaunchResult<i32> {
        (**self).execute(invocation).await
    }
}

/// Spawns real child processes with inherited stdio and waits for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> LaunchResult<i32> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.get_args())
            .envs(invocation.envs().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = invocation.cwd() {
            cmd.current_dir(dir);
        }

        let status = cmd.status().await.map_err(|source| LaunchError::Spawn {
            program: invocation.program().to_string(),
            source,
        })?;
        Ok(exit_code(status))
    }
}

/// Shell-style exit code: the child's code, or `128 + signal` when killed.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
