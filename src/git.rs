//! # Git Publishing
//!
//! Stage, commit e push del repository di storage. Le tre chiamate sono
//! indipendenti: ognuna può fallire senza impedire le successive.

use crate::config::Config;
use crate::error::SoftFailure;
use crate::runner::{CommandRunner, ExternalCommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Runs `git add .`, `git commit -m ...` and `git push <remote> <branch>`
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
}

impl GitPublisher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            repo_dir: config.project_root.clone(),
            remote: config.git_remote.clone(),
            branch: config.git_branch.clone(),
        }
    }

    pub fn commit_message(image_count: usize) -> String {
        format!("Auto-upload assets: {} new images", image_count)
    }

    /// The three invocations, in order
    pub fn commands(&self, image_count: usize) -> Vec<ExternalCommand> {
        let git = || ExternalCommand::new("git").current_dir(&self.repo_dir);
        vec![
            git().args(["add", "."]),
            git().args(["commit", "-m"]).arg(Self::commit_message(image_count)),
            git().arg("push").arg(&self.remote).arg(&self.branch),
        ]
    }

    /// Run every command, logging failures. Returns the failures that occurred.
    pub async fn publish(&self, runner: &dyn CommandRunner, image_count: usize) -> Vec<SoftFailure> {
        let mut failures = Vec::new();
        for command in self.commands(image_count) {
            match runner.run(&command).await {
                Ok(output) => {
                    info!("✔ {}", command);
                    if !output.stdout.trim().is_empty() {
                        debug!("{}", output.stdout.trim_end());
                    }
                }
                Err(failure) => {
                    warn!("Warning: {}", failure);
                    failures.push(failure);
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        let publisher = GitPublisher::from_config(&Config::for_root("/srv/assets"));
        let commands = publisher.commands(3);

        let rendered: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "git add .",
                "git commit -m \"Auto-upload assets: 3 new images\"",
                "git push origin main",
            ]
        );
        assert!(commands
            .iter()
            .all(|c| c.current_dir.as_deref() == Some(std::path::Path::new("/srv/assets"))));
    }
}
