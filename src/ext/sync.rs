use crate::internal_prelude::*;
use std::process::{Output, Stdio};
use tokio::{process::Command, sync::broadcast};

pub enum CommandResult {
    Success(Output),
    Failure(Output),
    Interrupted,
}

pub trait OutputExt {
    fn stdout(&self) -> String;
    fn stderr(&self) -> String;
}

impl OutputExt for Output {
    fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Runs the command with piped output until it exits or an interrupt arrives.
/// An interrupted process is killed.
pub async fn wait_piped_interruptible(
    name: &str,
    mut cmd: Command,
    mut interrupt_rx: broadcast::Receiver<()>,
) -> Result<CommandResult> {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let process = cmd.spawn().wrap_err(format!("Could not start {name}"))?;

    tokio::select! {
        res = process.wait_with_output() => {
            let output = res.wrap_err(format!("{name} did not run to completion"))?;
            if output.status.success() {
                trace!("{name} process finished with success");
                Ok(CommandResult::Success(output))
            } else {
                trace!("{name} process finished with code {:?}", output.status.code());
                Ok(CommandResult::Failure(output))
            }
        }
        _ = interrupt_rx.recv() => {
            trace!("{name} process interrupted");
            Ok(CommandResult::Interrupted)
        }
    }
}
