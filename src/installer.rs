//! Node installation flow: per-entry install/update of configured community
//! nodes, then a sweep over unconfigured node directories so their
//! dependencies are installed too.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::console;
use crate::fetch::FetchError;
use crate::fetch::repo::RepoFetcher;
use crate::fetch::runner::CommandRunner;
use crate::model::config::{NodeEntry, NodesConfig};
use crate::net::MirrorResolver;
use crate::settings::Settings;

const COMMUNITY_KIND: &str = "Community";

pub fn install_all(config: &NodesConfig, settings: &Settings, runner: &dyn CommandRunner) {
    let mirror = MirrorResolver::new();
    let repos = RepoFetcher::new(runner, &mirror);
    let mut configured: HashSet<String> = HashSet::new();
    let mut failures = 0usize;

    for section in config.sections() {
        for entry in &section.entries {
            configured.insert(entry.name.clone());

            let kind = entry.kind.as_deref().unwrap_or("unspecified");
            console::section(&format!("Processing node: {} (Type: {kind})", entry.name));

            if entry.kind.as_deref() != Some(COMMUNITY_KIND) {
                console::info("Skipping non-Community type node");
                continue;
            }

            let (Some(repo_url), Some(install_path)) =
                (entry.repository.as_deref(), entry.install_path.as_deref())
            else {
                console::warn("Skipping node without repository or install path");
                continue;
            };

            let dest = settings.app_dir.join(install_path);
            if let Err(err) = install_one(&repos, runner, settings, entry, repo_url, &dest) {
                failures += 1;
                console::error(&format!("Error installing node {}: {err}", entry.name));
                tracing::error!(node = %entry.name, error = %err, "node install failed");
            }
        }
    }

    sweep_unconfigured(settings, runner, &configured);

    if failures == 0 {
        console::success("All nodes installed successfully");
    } else {
        console::warn(&format!("Node installation finished with {failures} failures"));
    }
}

fn install_one(
    repos: &RepoFetcher,
    runner: &dyn CommandRunner,
    settings: &Settings,
    entry: &NodeEntry,
    repo_url: &str,
    dest: &Path,
) -> Result<(), FetchError> {
    repos.sync(entry, repo_url, dest)?;
    install_requirements(runner, settings, dest)?;

    let install_script = dest.join("install.py");
    if install_script.exists() {
        console::info("Running installation script...");
        let python = settings.python();
        runner.run(
            &python.to_string_lossy(),
            &[&install_script.to_string_lossy()],
            Some(dest),
        )?;
    }

    Ok(())
}

fn install_requirements(
    runner: &dyn CommandRunner,
    settings: &Settings,
    dest: &Path,
) -> Result<(), FetchError> {
    let requirements = dest.join("requirements.txt");
    if !requirements.exists() {
        return Ok(());
    }

    console::info("Installing dependencies...");
    let pip = settings.pip();
    runner.run(
        &pip.to_string_lossy(),
        &["install", "-r", &requirements.to_string_lossy()],
        Some(dest),
    )
}

/// Nodes dropped into the directory by hand still need their dependencies.
fn sweep_unconfigured(settings: &Settings, runner: &dyn CommandRunner, configured: &HashSet<String>) {
    let nodes_dir = settings.nodes_dir();
    let Ok(entries) = fs::read_dir(&nodes_dir) else {
        return;
    };

    console::section("Checking for additional nodes...");
    for dir_entry in entries.flatten() {
        let path = dir_entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if configured.contains(&name) {
            continue;
        }

        console::info(&format!(
            "Found additional node: {name}, installing dependencies"
        ));
        if let Err(err) = install_requirements(runner, settings, &path) {
            console::error(&format!("Error installing dependencies for {name}: {err}"));
            tracing::error!(node = %name, error = %err, "sweep install failed");
        }
    }
}
