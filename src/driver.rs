//! Batch driver for the model-acquisition pipeline. Walks the configuration
//! in document order and touches every descriptor exactly once; a failing
//! fetch is recorded and never aborts the remaining descriptors.

use crate::console;
use crate::fetch::classify::{AssetKind, classify};
use crate::fetch::file::FileFetcher;
use crate::fetch::repo::RepoFetcher;
use crate::fetch::runner::CommandRunner;
use crate::model::config::NodesConfig;
use crate::model::outcome::{Outcome, RunReport};
use crate::net::MirrorResolver;
use crate::settings::Settings;

pub fn download_models(
    config: &NodesConfig,
    settings: &Settings,
    runner: &dyn CommandRunner,
    mirror: &MirrorResolver,
) -> RunReport {
    let files = FileFetcher::new(runner, mirror);
    let repos = RepoFetcher::new(runner, mirror);
    let mut report = RunReport::default();

    for section in config.sections() {
        console::section(&format!("Processing section: {}", section.name));

        for entry in &section.entries {
            if entry.models.is_empty() {
                continue;
            }
            console::info(&format!("Processing node: {}", entry.name));

            for model in &entry.models {
                let label = model.display_name();

                if !model.is_complete() {
                    console::warn(&format!(
                        "Skipping model: {label} because url or path is empty"
                    ));
                    report.push(
                        &section.name,
                        &entry.name,
                        label,
                        Outcome::Skipped("url or path is empty".to_string()),
                    );
                    continue;
                }

                let dest = settings.models_dir.join(&model.path);
                console::info(&format!("URL: {}", model.url));
                console::info(&format!("Save path: {}", dest.display()));

                let result = match classify(&model.path) {
                    AssetKind::SingleFile => files.fetch(&model.url, &dest),
                    AssetKind::RepositoryCheckout => repos.mirror_repo(&model.url, &dest),
                };

                let outcome = match result {
                    Ok(()) => Outcome::Succeeded,
                    Err(err) => {
                        console::error(&format!("Error during download: {err}"));
                        tracing::error!(
                            section = %section.name,
                            node = %entry.name,
                            model = label,
                            error = %err,
                            "descriptor fetch failed"
                        );
                        Outcome::Failed(err)
                    }
                };
                report.push(&section.name, &entry.name, label, outcome);
            }
        }
    }

    console::success(&format!("Download completed! {}", report.summary()));
    report
}
