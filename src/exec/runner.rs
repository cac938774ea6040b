//! Process runner implementations

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use colored::Colorize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Invocation, Output, ProcessRunner};
use crate::common::{Error, Result};

/// Spawns real processes and waits for them to exit
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Output> {
        tracing::info!(step = %invocation.step, "Running {}", invocation.program);
        tracing::debug!(cwd = %invocation.cwd.display(), "$ {}", invocation);

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(if invocation.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::tool_spawn(&invocation.step, &invocation.program, e))?;

        // Feed stdin concurrently so a chatty child cannot fill its stdout pipe
        // while we are still writing.
        let writer = match (child.stdin.take(), invocation.input.clone()) {
            (Some(mut stdin), Some(input)) => Some(tokio::spawn(async move {
                stdin.write_all(&input).await?;
                stdin.shutdown().await
            })),
            _ => None,
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::tool_spawn(&invocation.step, &invocation.program, e))?;

        if let Some(writer) = writer {
            let written = match writer.await {
                Ok(result) => result,
                Err(e) => Err(io::Error::other(e)),
            };
            match written {
                // The child may legitimately exit without reading all input;
                // its exit status decides.
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(Error::tool_spawn(&invocation.step, &invocation.program, e)),
            }
        }

        let code = output.status.code();
        tracing::debug!(step = %invocation.step, ?code, stdout_bytes = output.stdout.len(), "Process exited");

        if !output.status.success() {
            return Err(Error::tool_failed(
                &invocation.step,
                code,
                &output.stdout,
                &output.stderr,
            ));
        }

        Ok(Output {
            code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Prints each invocation instead of running it
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

#[async_trait]
impl ProcessRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Output> {
        println!(
            "{} {}",
            format!("[{}]", invocation.step).cyan(),
            invocation.to_string().dimmed()
        );
        Ok(Output {
            code: Some(0),
            ..Output::default()
        })
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
