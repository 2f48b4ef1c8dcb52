//! Standalone end-to-end flow: environment manager, studio checkout, node
//! install, model download. Unlike the batch pipeline, any step failure here
//! aborts immediately with a non-zero exit.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::console;
use crate::driver;
use crate::fetch::runner::CommandRunner;
use crate::installer;
use crate::model::config::NodesConfig;
use crate::net::MirrorResolver;
use crate::settings::Settings;

const STUDIO_REPO: &str = "https://github.com/comfyanonymous/ComfyUI.git";
const ENV_NAME: &str = "atelier_env";

#[cfg(target_os = "macos")]
const MINICONDA_INSTALLER: &str = "Miniconda3-latest-MacOSX-x86_64.sh";
#[cfg(not(target_os = "macos"))]
const MINICONDA_INSTALLER: &str = "Miniconda3-latest-Linux-x86_64.sh";

pub fn run(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    ensure_conda(runner).context("conda installation")?;
    create_env(runner).context("environment creation")?;
    clone_studio(settings, runner).context("studio checkout")?;
    install_studio_deps(settings, runner).context("studio dependencies")?;

    if settings.config.exists() {
        let config = NodesConfig::load(&settings.config).context("configuration")?;
        installer::install_all(&config, settings, runner);

        let mirror = MirrorResolver::new();
        let report = driver::download_models(&config, settings, runner, &mirror);
        console::success(&format!("Bootstrap finished: {}", report.summary()));
    } else {
        console::warn("Configuration file not found, skipping node and model setup");
    }

    Ok(())
}

fn ensure_conda(runner: &dyn CommandRunner) -> Result<()> {
    if runner.run("conda", &["--version"], None).is_ok() {
        console::info("Conda is already installed");
        return Ok(());
    }

    console::info("Installing Conda...");
    let installer_url = format!("https://repo.anaconda.com/miniconda/{MINICONDA_INSTALLER}");
    runner.run("curl", &["-O", &installer_url], None)?;

    let prefix = conda_prefix();
    let prefix_arg = prefix.to_string_lossy();
    runner.run("bash", &[MINICONDA_INSTALLER, "-b", "-p", &prefix_arg], None)?;
    console::success("Conda installation completed");
    Ok(())
}

fn create_env(runner: &dyn CommandRunner) -> Result<()> {
    console::info("Creating Conda virtual environment...");
    runner.run(
        "conda",
        &[
            "create", "-n", ENV_NAME, "python=3.10", "wget", "git", "git-lfs", "-y",
        ],
        None,
    )?;
    Ok(())
}

fn clone_studio(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    if settings.app_dir.join(".git").exists() {
        console::info("Studio checkout already present");
        return Ok(());
    }

    console::info("Cloning the studio application...");
    fs::create_dir_all(&settings.app_dir)?;
    runner.run("git", &["clone", STUDIO_REPO, "."], Some(&settings.app_dir))?;
    Ok(())
}

fn install_studio_deps(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    console::info("Installing studio dependencies...");
    runner.run(
        "pip",
        &["install", "-r", "requirements.txt"],
        Some(&settings.app_dir),
    )?;
    Ok(())
}

fn conda_prefix() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("miniconda3"))
        .unwrap_or_else(|| PathBuf::from("miniconda3"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::runner::recording::RecordingRunner;

    #[test]
    fn full_flow_without_config_runs_core_steps() {
        let runner = RecordingRunner::new();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::for_test(dir.path());

        run(&settings, &runner).unwrap();

        let lines = runner.lines();
        assert_eq!(lines[0], "conda --version");
        assert!(runner.count_matching("conda create -n atelier_env") == 1);
        assert_eq!(runner.count_matching("git clone"), 1);
        assert_eq!(runner.count_matching("pip install -r requirements.txt"), 1);
    }

    #[test]
    fn missing_conda_triggers_installer_download() {
        let runner = RecordingRunner::new();
        runner.fail_times("conda --version", 1);
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::for_test(dir.path());

        run(&settings, &runner).unwrap();

        assert_eq!(runner.count_matching("curl -O"), 1);
        assert_eq!(runner.count_matching("bash Miniconda3-latest-"), 1);
    }

    #[test]
    fn existing_checkout_is_not_recloned() {
        let runner = RecordingRunner::new();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::for_test(dir.path());
        fs::create_dir_all(settings.app_dir.join(".git")).unwrap();

        run(&settings, &runner).unwrap();

        assert_eq!(runner.count_matching("git clone"), 0);
    }

    #[test]
    fn step_failure_aborts_the_flow() {
        let runner = RecordingRunner::new();
        runner.fail_always("conda create");
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::for_test(dir.path());

        assert!(run(&settings, &runner).is_err());
        // Later steps never ran.
        assert_eq!(runner.count_matching("git clone"), 0);
    }

    #[test]
    fn config_present_drives_nodes_and_models() {
        let runner = RecordingRunner::new();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::for_test(dir.path());
        fs::write(
            &settings.config,
            "custom_nodes:\n  - name: up\n    type: Community\n    repository: https://example.com/up.git\n    install_path: custom_nodes/up\n    models:\n      - url: https://example.com/w.pth\n        path: models/w.pth\n",
        )
        .unwrap();

        run(&settings, &runner).unwrap();

        assert_eq!(runner.count_matching("git clone https://example.com/up.git"), 1);
        assert_eq!(runner.count_matching("wget"), 1);
    }
}
