//! Helpers which are shared by the integration tests of the explainer and the binary.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::fs::File;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use mussel_solver::model::Comparator;
use mussel_solver::model::LinearConstraint;
use mussel_solver::model::Model;
use mussel_solver::model::VariableId;
use mussel_solver::ConstraintId;
use wait_timeout::ChildExt;

/// Posts `\sum terms ? rhs` into the model.
pub(crate) fn linear(
    model: &mut Model,
    terms: &[(i64, VariableId)],
    comparator: Comparator,
    rhs: i64,
) -> ConstraintId {
    let constraint = LinearConstraint::new(terms.iter().copied(), comparator, rhs)
        .expect("coefficients fit in 64 bits");
    model.add_constraint(constraint)
}

/// Posts `variable ? rhs` into the model.
pub(crate) fn compare(
    model: &mut Model,
    variable: VariableId,
    comparator: Comparator,
    rhs: i64,
) -> ConstraintId {
    linear(model, &[(1, variable)], comparator, rhs)
}

/// The output of a run of the binary.
#[derive(Debug)]
pub(crate) struct Run {
    pub(crate) succeeded: bool,
    pub(crate) stdout: String,
}

impl Run {
    /// The printed sets, i.e. the lines which do not start with the log prefix.
    pub(crate) fn explanations(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter(|line| !line.starts_with('%'))
            .collect()
    }
}

pub(crate) fn instance_path(instance_name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}/tests/instances/{instance_name}",
        env!("CARGO_MANIFEST_DIR")
    ))
}

/// Runs the binary on the given instance; `prefix` distinguishes the output files of tests which
/// run on the same instance.
pub(crate) fn run_mussel(instance_name: &str, prefix: &str, args: &[&str]) -> Run {
    const TEST_TIMEOUT: Duration = Duration::from_secs(60);

    let instance_path = instance_path(instance_name);
    let log_file_path = instance_path.with_extension(format!("{prefix}.log"));

    let mut child = Command::new(env!("CARGO_BIN_EXE_mussel-solver"))
        .args(args)
        .arg(&instance_path)
        .stdout(File::create(&log_file_path).expect("Failed to create log file."))
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run mussel-solver.");

    let succeeded = match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => panic!("mussel-solver took more than {} seconds", TEST_TIMEOUT.as_secs()),
        Ok(Some(status)) => status.success(),
        Err(e) => panic!("error starting mussel-solver: {e}"),
    };

    let stdout = std::fs::read_to_string(&log_file_path).expect("Failed to read log file.");
    std::fs::remove_file(&log_file_path).expect("Failed to remove log file.");

    Run { succeeded, stdout }
}
