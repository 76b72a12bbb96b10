use crate::error::{IndexerError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

/// Materializes a repository's working tree into an empty directory.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    async fn fetch(&self, repo_url: &str, dest: &Path) -> Result<()>;
}

/// Shallow, single-branch `git clone` through the system git binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl RepoFetcher for GitCli {
    async fn fetch(&self, repo_url: &str, dest: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .args(["clone", "--depth", "1", "--single-branch", "--quiet"])
            .arg(repo_url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| IndexerError::CloneFailed {
                url: repo_url.to_string(),
                reason: format!("failed to spawn {}: {err}", self.program),
            })?;

        if !output.status.success() {
            return Err(IndexerError::CloneFailed {
                url: repo_url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        log::info!("Cloned {repo_url} into {}", dest.display());
        Ok(())
    }
}

/// A repository checkout that owns its temporary directory.
///
/// Dropping the checkout removes the directory; [`RepoCheckout::release`]
/// does the same but reports removal errors.
pub struct RepoCheckout {
    dir: TempDir,
}

impl RepoCheckout {
    /// Create an isolated directory under `scratch_root` and fetch into it.
    pub async fn acquire(
        fetcher: &dyn RepoFetcher,
        repo_url: &str,
        scratch_root: &Path,
    ) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("sitelens-repo-")
            .tempdir_in(scratch_root)?;
        log::debug!("Fetching {repo_url} into {}", dir.path().display());
        // `dir` is dropped, and removed, if the fetch fails.
        fetcher.fetch(repo_url, dir.path()).await?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        log::info!("Removed checkout {}", path.display());
        Ok(())
    }
}
