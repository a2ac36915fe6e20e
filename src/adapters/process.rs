//! External program adapters.
//!
//! The kiosk narrates questions through a TTS program and refreshes its
//! question bank through a script.  Both are plain child processes; this
//! module only launches them and reports how they exited.

use std::path::Path;

use log::{info, warn};
use tokio::process::Command;

use crate::config::{NarrationConfig, QuestionBankConfig};
use crate::error::ProcessError;

/// Captured output of a finished program.
#[derive(Debug, Clone, Default)]
pub struct ProgramOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args…` to completion.  Non-zero exit is an error.
pub async fn run_program(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
) -> Result<ProgramOutput, ProcessError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let output = cmd.output().await.map_err(ProcessError::Spawn)?;
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if output.status.success() {
        Ok(ProgramOutput { stdout, stderr })
    } else {
        Err(ProcessError::Failed {
            code: output.status.code(),
            stderr,
        })
    }
}

// ── Narration ─────────────────────────────────────────────────

/// Speaks text through the configured TTS program.
pub struct Narrator {
    config: NarrationConfig,
}

impl Narrator {
    pub fn new(config: NarrationConfig) -> Self {
        Self { config }
    }

    pub async fn speak(&self, text: &str) -> Result<(), ProcessError> {
        let preview: String = text.chars().take(30).collect();
        info!("Speaking: {}{}", preview, if text.chars().count() > 30 { "..." } else { "" });

        // Text after `--` is always a positional argument, even when it
        // starts with a dash.
        let mut args = self.config.args.clone();
        args.push("--".to_string());
        args.push(text.to_string());
        run_program(&self.config.program, &args, None).await.map(|_| ())
    }
}

// ── Question bank ─────────────────────────────────────────────

/// Runs the question-bank refresh script.
pub struct QuestionBankRefresher {
    config: QuestionBankConfig,
}

impl QuestionBankRefresher {
    pub fn new(config: QuestionBankConfig) -> Self {
        Self { config }
    }

    pub async fn refresh(&self) -> Result<ProgramOutput, ProcessError> {
        let args = [self.config.script.clone()];
        let out = run_program(
            &self.config.interpreter,
            &args,
            Some(&self.config.working_dir),
        )
        .await?;
        if !out.stderr.is_empty() {
            warn!("Question refresh stderr: {}", out.stderr);
        }
        info!("Question refresh stdout: {}", out.stdout);
        Ok(out)
    }
}
