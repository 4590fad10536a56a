//! # External Command Runner
//!
//! Ogni processo esterno (cwebp, git) passa da qui.
//!
//! ## Responsabilità:
//! - `ExternalCommand`: programma, argomenti e working directory
//! - `CommandRunner`: trait con una sola operazione, `run`, sostituibile nei test
//! - `SystemRunner`: implementazione reale con `tokio::process::Command`
//!
//! Un comando che non parte o che esce con stato diverso da zero produce un
//! `SoftFailure`: la decisione di ignorarlo spetta sempre al chiamante.

use crate::error::SoftFailure;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args<T, I>(mut self, args: I) -> Self
    where
        T: ToString,
        I: IntoIterator<Item = T>,
    {
        self.args.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Runs external programs to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ExternalCommand) -> Result<CommandOutput, SoftFailure>;
}

/// Spawns real processes and waits for them, without timeout
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ExternalCommand) -> Result<CommandOutput, SoftFailure> {
        debug!("Running: {}", command);

        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(ref dir) = command.current_dir {
            process.current_dir(dir);
        }

        let start_time = std::time::Instant::now();
        let output = process
            .output()
            .await
            .map_err(|e| SoftFailure::new(command.to_string(), e.to_string()))?;
        debug!("{} finished in {:?}", command.program, start_time.elapsed());

        if output.status.success() {
            Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = match stderr.trim() {
                "" => output.status.to_string(),
                message => format!("{}: {}", output.status, message),
            };
            Err(SoftFailure::new(command.to_string(), diagnostic))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let command = ExternalCommand::new("git")
            .args(["commit", "-m"])
            .arg("Auto-upload assets: 2 new images");
        assert_eq!(command.to_string(), "git commit -m \"Auto-upload assets: 2 new images\"");
    }

    #[test]
    fn test_args_mixed_types() {
        let command = ExternalCommand::new("cwebp").arg("-q").arg(60).args(["-resize", "1280", "0"]);
        assert_eq!(command.args, vec!["-q", "60", "-resize", "1280", "0"]);
        assert!(command.current_dir.is_none());
    }

    #[tokio::test]
    async fn test_missing_program_is_soft_failure() {
        let command = ExternalCommand::new("definitely-not-a-real-binary-7f3a").arg("--help");
        let result = SystemRunner.run(&command).await;
        let failure = result.unwrap_err();
        assert!(failure.call.starts_with("definitely-not-a-real-binary-7f3a"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_and_stdout() {
        let ok = SystemRunner
            .run(&ExternalCommand::new("sh").args(["-c", "printf hello"]))
            .await
            .unwrap();
        assert_eq!(ok.stdout, "hello");

        let failed = SystemRunner
            .run(&ExternalCommand::new("sh").args(["-c", "echo broken >&2; exit 3"]))
            .await
            .unwrap_err();
        assert!(failed.diagnostic.contains("broken"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_current_dir_is_applied() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = SystemRunner
            .run(&ExternalCommand::new("pwd").current_dir(temp.path()))
            .await
            .unwrap();
        let reported = std::fs::canonicalize(out.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(temp.path()).unwrap());
    }
}
