//! Text and JSON rendering of reports.

use std::path::Path;

use anyhow::{Context, Result};
use bpv_core::Stage;
use bpv_validate::{BatchReport, CaseOutcome, CaseReport, ProfileReport, TestRunReport};
use serde::Serialize;

/// Print any report as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{text}");
    Ok(())
}

/// `path` relative to `root` when it lies under it.
pub fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn verdict(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Every stage of one profile with its errors and warnings.
pub fn print_profile_report(report: &ProfileReport, root: &Path) {
    let model = report.derived_model.as_deref().unwrap_or("?");
    println!(
        "Validating {} (model {model})",
        display_path(&report.path, root)
    );

    for stage in &report.stages {
        println!("  {}  {}", verdict(stage.result.valid), stage.stage);
        for error in &stage.result.errors {
            println!("        - {error}");
        }
        for warning in &stage.result.warnings {
            println!("        ! {warning}");
        }
    }
    for skipped in &report.skipped {
        println!("  SKIP  {} ({})", skipped.stage, skipped.reason);
    }

    if let Some(tests) = &report.tests {
        print_test_run(tests);
    }

    println!("Result: {}", verdict(report.valid));
}

/// Per-case lines for a test run, with payloads for mismatches.
pub fn print_test_run(tests: &TestRunReport) {
    println!(
        "  {}: {}/{} passed ({} available)",
        Stage::Tests,
        tests.passed,
        tests.cases.len(),
        tests.available
    );
    for case in &tests.cases {
        print_case(case);
    }
}

pub fn print_case(case: &CaseReport) {
    match &case.outcome {
        CaseOutcome::Matched => println!("    PASS  {} (matched)", case.name),
        CaseOutcome::Unverified { .. } => println!("    PASS  {} (unverified)", case.name),
        CaseOutcome::Error { message } => println!("    FAIL  {}: {message}", case.name),
        CaseOutcome::Mismatch {
            actual,
            expected,
            difference,
        } => {
            println!("    FAIL  {}: output mismatch", case.name);
            if let Some(d) = difference {
                println!("          {d}");
            }
            println!("          actual:   {actual}");
            println!("          expected: {expected}");
        }
    }
}

/// One line per file, then totals and the failing paths.
pub fn print_batch_report(report: &BatchReport, root: &Path) {
    for profile in &report.reports {
        println!(
            "  {}  {}",
            verdict(profile.valid),
            display_path(&profile.path, root)
        );
    }

    println!();
    println!("Profiles: {}/{} passed", report.passed, report.total);

    if report.failed > 0 {
        println!("\nFailed profiles:");
        for failure in &report.failures {
            println!("  {}", display_path(&failure.path, root));
            for error in &failure.errors {
                println!("      - {error}");
            }
        }
        println!(
            "\n{} profile(s) failed validation out of {} total.",
            report.failed, report.total
        );
    }
}
