use std::path::Path;
use std::process::Command;

use crate::fetch::FetchError;

/// Seam for every external collaborator (git, git-lfs, wget, pip, python,
/// conda). Production shells out; tests record invocations instead.
pub trait CommandRunner {
    /// Run a command to completion, inheriting stdio.
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), FetchError>;

    /// Run a command and capture its stdout.
    fn output(&self, program: &str, args: &[&str], cwd: Option<&Path>)
    -> Result<String, FetchError>;
}

#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), FetchError> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|source| FetchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(FetchError::CommandFailed {
                command: command_line(program, args),
                detail: status.to_string(),
            })
        }
    }

    fn output(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<String, FetchError> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| FetchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(FetchError::CommandFailed {
                command: command_line(program, args),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

pub(crate) fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub mod recording {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::{CommandRunner, command_line};
    use crate::fetch::FetchError;

    #[derive(Debug, Clone)]
    pub struct Invocation {
        pub line: String,
        pub cwd: Option<PathBuf>,
    }

    /// Test double that records every invocation and never touches the
    /// system. Failures and captured outputs are scripted per command-line
    /// prefix.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        calls: RefCell<Vec<Invocation>>,
        failures: RefCell<HashMap<String, usize>>,
        outputs: RefCell<HashMap<String, String>>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_times(&self, prefix: &str, times: usize) {
            self.failures.borrow_mut().insert(prefix.to_string(), times);
        }

        pub fn fail_always(&self, prefix: &str) {
            self.fail_times(prefix, usize::MAX);
        }

        pub fn set_output(&self, prefix: &str, output: &str) {
            self.outputs
                .borrow_mut()
                .insert(prefix.to_string(), output.to_string());
        }

        pub fn lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|call| call.line.clone()).collect()
        }

        pub fn cwds(&self) -> Vec<Option<PathBuf>> {
            self.calls.borrow().iter().map(|call| call.cwd.clone()).collect()
        }

        pub fn count_matching(&self, prefix: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|call| call.line.starts_with(prefix))
                .count()
        }

        fn record(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> String {
            let line = command_line(program, args);
            self.calls.borrow_mut().push(Invocation {
                line: line.clone(),
                cwd: cwd.map(Path::to_path_buf),
            });
            line
        }

        fn should_fail(&self, line: &str) -> bool {
            let mut failures = self.failures.borrow_mut();
            let Some(remaining) = failures
                .iter_mut()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, remaining)| remaining)
            else {
                return false;
            };

            if *remaining == 0 {
                return false;
            }
            *remaining = remaining.saturating_sub(1);
            true
        }

        fn scripted_failure(line: String) -> FetchError {
            FetchError::CommandFailed {
                command: line,
                detail: "exit status: 1".to_string(),
            }
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), FetchError> {
            let line = self.record(program, args, cwd);
            if self.should_fail(&line) {
                return Err(Self::scripted_failure(line));
            }
            Ok(())
        }

        fn output(
            &self,
            program: &str,
            args: &[&str],
            cwd: Option<&Path>,
        ) -> Result<String, FetchError> {
            let line = self.record(program, args, cwd);
            if self.should_fail(&line) {
                return Err(Self::scripted_failure(line));
            }

            let outputs = self.outputs.borrow();
            Ok(outputs
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, output)| output.clone())
                .unwrap_or_default())
        }
    }
}
