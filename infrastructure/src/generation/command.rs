//! Generation through a local command.
//!
//! The command runs under `sh -c` (`cmd /C` on Windows) with the system
//! prompt and revision prompt on stdin; trimmed stdout is the revised answer.

use async_trait::async_trait;
use critique_application::ports::generation::{GenerationError, GenerationGateway};
use critique_domain::core::string::truncate;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Maximum stderr carried in an error message
const MAX_STDERR_LEN: usize = 500;

pub struct CommandGenerationGateway {
    command: String,
}

impl CommandGenerationGateway {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn build(&self) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", &self.command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", &self.command]);
            c
        };
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Timeout and cancellation drop the future; the child goes with it
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl GenerationGateway for CommandGenerationGateway {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        let mut child = self.build().spawn().map_err(|e| {
            GenerationError::Connection(format!("failed to spawn `{}`: {}", self.command, e))
        })?;

        let stdin = child.stdin.take();
        let input = format!("{}\n\n{}\n", system_prompt, prompt);
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        if let Err(e) = written {
            // Commands that ignore stdin close the pipe early
            debug!("Could not write prompt to `{}`: {}", self.command, e);
        }
        let output = output.map_err(|e| GenerationError::Other(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::RequestFailed(format!(
                "`{}` exited with {}: {}",
                self.command,
                output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                truncate(stderr.trim(), MAX_STDERR_LEN)
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "command"
    }
}
