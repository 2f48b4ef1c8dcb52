use crate::fetch::FetchError;

/// Terminal state for one processed descriptor. A descriptor is touched
/// exactly once per run; there are no transitions out of these states.
#[derive(Debug)]
pub enum Outcome {
    Succeeded,
    Skipped(String),
    Failed(FetchError),
}

impl Outcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct DescriptorReport {
    pub section: String,
    pub node: String,
    pub model: String,
    pub outcome: Outcome,
}

/// Per-run aggregation of descriptor outcomes. Never persisted; lives only
/// long enough to drive console reporting.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<DescriptorReport>,
}

impl RunReport {
    pub fn push(&mut self, section: &str, node: &str, model: &str, outcome: Outcome) {
        self.outcomes.push(DescriptorReport {
            section: section.to_string(),
            node: node.to_string(),
            model: model.to_string(),
            outcome,
        });
    }

    pub fn outcomes(&self) -> &[DescriptorReport] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.count(Outcome::is_succeeded)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::is_skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failed)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} skipped, {} failed",
            self.succeeded(),
            self.skipped(),
            self.failed()
        )
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}
