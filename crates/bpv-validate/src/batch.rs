//! # Batch Driver
//!
//! Runs the single-file pipeline over a list of profiles and aggregates
//! the results. Files are validated one at a time, to completion; a
//! failing file never stops the run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pipeline::{ProfileReport, ProfileValidator, ValidateOptions};

/// A file that failed, with its errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub errors: Vec<String>,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
    pub reports: Vec<ProfileReport>,
}

impl BatchReport {
    /// True when every file passed. An empty batch is a success here;
    /// callers decide whether "nothing found" is an error.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn failed_paths(&self) -> impl Iterator<Item = &Path> {
        self.failures.iter().map(|f| f.path.as_path())
    }
}

/// Validate every file in `files`, in order.
pub fn run_batch<P: AsRef<Path>>(
    files: &[P],
    validator: &ProfileValidator,
    options: &ValidateOptions,
) -> BatchReport {
    let mut report = BatchReport {
        total: files.len(),
        ..BatchReport::default()
    };

    for file in files {
        let path = file.as_ref();
        let result = validator.validate_file(path, options);
        if result.valid {
            report.passed += 1;
        } else {
            report.failed += 1;
            tracing::info!(path = %path.display(), errors = result.errors().len(), "profile failed");
            report.failures.push(BatchFailure {
                path: path.to_path_buf(),
                errors: result.errors(),
            });
        }
        report.reports.push(result);
    }

    tracing::info!(
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        "batch finished"
    );
    report
}
