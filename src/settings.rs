use std::path::PathBuf;

/// Directory layout and config location, shared by every subcommand.
/// Flags override environment variables, which override the defaults the
/// container images ship with.
#[derive(Debug, Clone, clap::Args)]
pub struct Settings {
    /// Path to the nodes/models configuration document.
    #[arg(long, env = "ATELIER_CONFIG", default_value = "configs/custom_nodes.yml")]
    pub config: PathBuf,

    /// Root directory of the studio application checkout.
    #[arg(long, env = "ATELIER_APP_DIR", default_value = "ComfyUI")]
    pub app_dir: PathBuf,

    /// Base directory model files are saved under.
    #[arg(long, env = "ATELIER_MODELS_DIR", default_value = "/data")]
    pub models_dir: PathBuf,

    /// Virtualenv bin directory holding pip and python.
    /// Defaults to <app-dir>/venv/bin.
    #[arg(long, env = "ATELIER_VENV_DIR")]
    pub venv_dir: Option<PathBuf>,
}

impl Settings {
    pub fn venv_bin(&self) -> PathBuf {
        self.venv_dir
            .clone()
            .unwrap_or_else(|| self.app_dir.join("venv/bin"))
    }

    pub fn pip(&self) -> PathBuf {
        self.venv_bin().join("pip")
    }

    pub fn python(&self) -> PathBuf {
        self.venv_bin().join("python")
    }

    pub fn nodes_dir(&self) -> PathBuf {
        self.app_dir.join("custom_nodes")
    }
}

#[cfg(test)]
impl Settings {
    pub fn for_test(root: &std::path::Path) -> Self {
        Self {
            config: root.join("custom_nodes.yml"),
            app_dir: root.join("studio"),
            models_dir: root.join("data"),
            venv_dir: None,
        }
    }
}
