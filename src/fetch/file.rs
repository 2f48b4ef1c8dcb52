use std::fs;
use std::path::Path;

use crate::console;
use crate::fetch::FetchError;
use crate::fetch::runner::CommandRunner;
use crate::net::MirrorResolver;

/// Attempts per download, including the first.
pub const RETRY_BUDGET: usize = 3;

/// Downloads a single file through the external resumable transfer tool.
/// Each attempt resumes from whatever partial content the previous one left.
pub struct FileFetcher<'a> {
    runner: &'a dyn CommandRunner,
    mirror: &'a MirrorResolver,
}

impl<'a> FileFetcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, mirror: &'a MirrorResolver) -> Self {
        Self { runner, mirror }
    }

    pub fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        console::info(&format!("Downloading file: {url}"));

        let url = self.mirror.resolve(url);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let dest_arg = dest.to_string_lossy();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .runner
                .run("wget", &["-c", "-t", "3", "-O", &dest_arg, &url], None)
            {
                Ok(()) => {
                    console::success(&format!("File downloaded: {}", dest.display()));
                    return Ok(());
                }
                Err(err) if attempt < RETRY_BUDGET => {
                    tracing::warn!(attempt, error = %err, "download attempt failed");
                    console::warn(&format!("Download failed, retrying attempt {}...", attempt + 1));
                }
                Err(err) => {
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
            }
        }
    }
}
