use std::fs;
use std::path::Path;

use crate::console;
use crate::fetch::FetchError;
use crate::fetch::runner::CommandRunner;
use crate::model::config::NodeEntry;
use crate::net::MirrorResolver;

/// Branch pulled when no revision is pinned. The upstream remote is assumed
/// to use this name; a remote with a different default branch will fail the
/// pull and surface as a per-entry error.
const DEFAULT_BRANCH: &str = "main";

pub struct RepoFetcher<'a> {
    runner: &'a dyn CommandRunner,
    mirror: &'a MirrorResolver,
}

impl<'a> RepoFetcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, mirror: &'a MirrorResolver) -> Self {
        Self { runner, mirror }
    }

    /// Full checkout of a model repository: any existing destination is
    /// replaced by a fresh clone, then large-file content is pulled when the
    /// LFS extension is available.
    pub fn mirror_repo(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        console::info(&format!("Cloning model repository: {url}"));
        let url = self.mirror.resolve(url);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        if dest.exists() {
            fs::remove_dir_all(dest)?;
        }

        let dest_arg = dest.to_string_lossy();
        self.runner.run("git", &["clone", &url, &dest_arg], None)?;

        if self.lfs_available() {
            self.runner.run("git", &["lfs", "pull"], Some(dest))?;
        } else {
            console::warn(
                "Warning: git-lfs not detected, skipping large file downloads. \
                 Please install git-lfs to download large files.",
            );
            tracing::warn!("git-lfs unavailable, large files not pulled");
        }

        console::success(&format!("Repository downloaded: {}", dest.display()));
        Ok(())
    }

    /// Install or update a node checkout in place, honoring a pinned revision.
    pub fn sync(&self, entry: &NodeEntry, url: &str, dest: &Path) -> Result<(), FetchError> {
        if dest.exists() {
            console::info("Node directory already exists, updating...");
            self.runner.run("git", &["fetch", "origin"], Some(dest))?;

            match entry.pinned_revision() {
                Some(revision) => {
                    let head = self.runner.output("git", &["rev-parse", "HEAD"], Some(dest))?;
                    if head.trim() == revision {
                        console::info("Already on the pinned revision");
                    } else {
                        console::info(&format!("Switching to pinned revision: {revision}"));
                        self.runner.run("git", &["checkout", revision], Some(dest))?;
                    }
                }
                None => {
                    console::info("No revision pinned, pulling the latest state");
                    self.runner
                        .run("git", &["pull", "origin", DEFAULT_BRANCH], Some(dest))?;
                }
            }
        } else {
            console::info("Cloning node repository...");
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            let dest_arg = dest.to_string_lossy();
            self.runner.run("git", &["clone", url, &dest_arg], None)?;

            if let Some(revision) = entry.pinned_revision() {
                console::info(&format!("Switching to pinned revision: {revision}"));
                self.runner.run("git", &["checkout", revision], Some(dest))?;
            }
        }

        Ok(())
    }

    fn lfs_available(&self) -> bool {
        self.runner.run("git", &["lfs", "--version"], None).is_ok()
    }
}
