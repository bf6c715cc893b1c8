use crate::domain::{DomainError, SshCommand, SshLauncher, SshSession};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// Runs the system SSH client with the terminal attached
#[derive(Debug, Default, Clone)]
pub struct SystemSshLauncher;

impl SystemSshLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SshLauncher for SystemSshLauncher {
    async fn spawn(&self, command: &SshCommand) -> Result<Box<dyn SshSession>, DomainError> {
        tracing::debug!(program = %command.program, args = ?command.args, "spawning ssh client");

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| DomainError::Launch(format!("{}: {}", command.program, e)))?;

        Ok(Box::new(ChildSession {
            child,
            program: command.program.clone(),
        }))
    }
}

struct ChildSession {
    child: Child,
    program: String,
}

#[async_trait]
impl SshSession for ChildSession {
    async fn wait(mut self: Box<Self>) -> Result<i32, DomainError> {
        // The client owns the terminal; Ctrl-C is meant for it, not for us.
        let status = loop {
            tokio::select! {
                status = self.child.wait() => break status,
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        tracing::debug!(error = %e, "cannot listen for Ctrl-C");
                        break self.child.wait().await;
                    }
                    tracing::debug!("Ctrl-C forwarded to ssh client");
                }
            }
        }
        .map_err(|e| DomainError::Launch(format!("waiting for {}: {}", self.program, e)))?;

        Ok(exit_code(status))
    }
}

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
