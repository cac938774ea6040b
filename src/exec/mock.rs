//! Recording runner for pipeline tests
//!
//! Emulates the default Go tool chain closely enough for the pipeline to run:
//! the test runner writes whatever `-coverprofile` names, the merger echoes
//! the profiles it was given, the converters wrap their input and the
//! summary reports a fixed total.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Invocation, Output, ProcessRunner};
use crate::common::{Error, Result};

#[derive(Clone, Default)]
pub(crate) struct RecordingRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    fail: Option<(String, i32)>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make the step with this label exit with `code`
    pub(crate) fn failing(step: &str, code: i32) -> Self {
        Self {
            fail: Some((step.to_string(), code)),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn steps(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.step).collect()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Output> {
        self.calls.lock().unwrap().push(invocation.clone());

        if let Some((step, code)) = &self.fail {
            if *step == invocation.step {
                return Err(Error::tool_failed(
                    step,
                    Some(*code),
                    b"--- FAIL: TestMock",
                    b"mock failure",
                ));
            }
        }

        let stdout = match invocation.program.as_str() {
            "gocovmerge" => {
                let mut merged = String::from("mode: set\n");
                for arg in &invocation.args {
                    merged.push_str(&format!("merged {arg}\n"));
                }
                merged
            }
            "gocov" => format!(
                "{{\"profile\":\"{}\"}}",
                invocation.args.last().cloned().unwrap_or_default()
            ),
            "gocov-xml" => {
                let input = invocation.input.clone().unwrap_or_default();
                format!("<coverage>{}</coverage>", String::from_utf8_lossy(&input))
            }
            _ if invocation.args.first().map(String::as_str) == Some("tool") => {
                "total:\t(statements)\t87.5%\n".to_string()
            }
            _ => {
                let mut args = invocation.args.iter();
                while let Some(arg) = args.next() {
                    let path = match arg.strip_prefix("-coverprofile=") {
                        Some(path) => Some(path),
                        None if arg == "-coverprofile" => args.next().map(String::as_str),
                        None => None,
                    };
                    if let Some(path) = path {
                        std::fs::write(invocation.cwd.join(path), format!("mode: set\n{path}\n"))?;
                    }
                }
                format!("ok {}\n", invocation.step)
            }
        };

        Ok(Output {
            code: Some(0),
            stdout: stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }
}
