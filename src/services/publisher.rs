use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

pub const CLEANUP_COMMIT_MESSAGE: &str = "chore: weekly cleanup of datasets folder";

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, relative: &str) -> Result<()>;

    async fn unpublish(&self, relative: &str) -> Result<()>;

    /// Removes all `relatives` in a single change.
    async fn purge(&self, relatives: &[String]) -> Result<()>;
}

pub struct GitPublisher {
    repo_root: PathBuf,
}

impl GitPublisher {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        GitPublisher {
            repo_root: repo_root.into(),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<()> {
        let command = format!("git {}", args.join(" "));
        log::debug!("Running {}", command);

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .await
            .map_err(|e| PipelineError::Git {
                command: command.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Git {
                command,
                detail: format!("{} {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, relative: &str) -> Result<()> {
        // -f: the datasets directory is git-ignored
        self.git(&["add", "-f", relative]).await?;
        let message = format!("Daily dataset {}", relative);
        self.git(&["commit", "-m", message.as_str()]).await?;
        self.git(&["push"]).await
    }

    async fn unpublish(&self, relative: &str) -> Result<()> {
        self.git(&["rm", "-f", relative]).await?;
        let message = format!("Remove {} due to pipeline error", relative);
        self.git(&["commit", "-m", message.as_str()]).await?;
        self.git(&["push"]).await
    }

    async fn purge(&self, relatives: &[String]) -> Result<()> {
        for relative in relatives {
            log::info!("Removing {}...", relative);
            self.git(&["rm", "-f", relative.as_str()]).await?;
        }
        self.git(&["commit", "-m", CLEANUP_COMMIT_MESSAGE]).await?;
        self.git(&["push"]).await
    }
}
