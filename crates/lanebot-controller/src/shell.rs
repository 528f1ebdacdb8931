use async_trait::async_trait;
use lanebot_types::Result;
use tokio::process::Command;
use tracing::debug;

use crate::{input_error, ProcessControl, WindowProbe};

/// Window probe backed by an external command: a zero exit status means
/// the window exists.
pub struct ShellWindowProbe {
    program: String,
    args: Vec<String>,
}

impl ShellWindowProbe {
    pub fn from_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Default probe matching the client window by its exact title.
    pub fn for_window_title(title: &str) -> Self {
        let script = format!(
            "if (Get-Process | Where-Object {{ $_.MainWindowTitle -eq '{title}' }}) {{ exit 0 }} exit 1"
        );
        Self::from_command(
            "powershell",
            vec!["-NoProfile".into(), "-Command".into(), script],
        )
    }
}

#[async_trait]
impl WindowProbe for ShellWindowProbe {
    async fn exists(&self) -> bool {
        match Command::new(&self.program).args(&self.args).output().await {
            Ok(output) => output.status.success(),
            Err(err) => {
                debug!("window probe command failed: {err}");
                false
            }
        }
    }
}

/// Kills the game client through an external command.
pub struct ShellProcessControl {
    program: String,
    args: Vec<String>,
}

impl ShellProcessControl {
    pub fn from_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Default force-kill by process image name.
    pub fn for_process(image_name: &str) -> Self {
        Self::from_command(
            "taskkill",
            vec!["/F".into(), "/IM".into(), image_name.into()],
        )
    }
}

#[async_trait]
impl ProcessControl for ShellProcessControl {
    async fn kill_game_client(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|err| {
                input_error(format!(
                    "failed to run {} {:?}: {err}",
                    self.program, self.args
                ))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(input_error(format!(
                "kill command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
