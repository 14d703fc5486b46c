// system-tests/tests/suites/smoke.rs
// ============================================================================
// Module: Smoke Tests
// Description: End-to-end host workflows against the stub firewall CLI.
// Purpose: Confirm rendering, process transport, and canonical output agree.
// Dependencies: system-tests helpers, fwcli-harness-core
// ============================================================================

//! ## Overview
//! Drives the `fake-dscli` stub through the process transport and compares
//! canonicalized reports with literal expectations.

use fwcli_harness_core::CanonicalizeOptions;
use fwcli_harness_core::CommandArgs;
use fwcli_harness_core::ErrorCode;
use fwcli_harness_core::Sample;
use fwcli_harness_core::expect_canonical;
use helpers::artifacts::TestReporter;
use helpers::checks::TestResult;
use helpers::checks::require;
use helpers::checks::require_eq;
use helpers::fake::FakeDscli;
use helpers::fake::host_args;
use helpers::fake::name_args;
use helpers::fake::render;
use system_tests::fake::FakeState;

use crate::helpers;

/// Canonical `showHost` report without tags.
const HOST_REPORT: &str = "Name                 : %s\nHost                 : %s\n\nOK\n";

/// Options used for host reports.
fn report_options() -> CanonicalizeOptions {
    CanonicalizeOptions::new().with_skip_date(true).with_cut_proxy(true)
}

#[test]
fn host_lifecycle_canonical_output() -> TestResult {
    let mut reporter = TestReporter::new("host_lifecycle_canonical_output")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let canonicalizer = fake.config("")?.build_canonicalizer()?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let output = executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?)?;
    require(output.text().contains("Backend"), "raw report lacks volatile fields")?;

    let canonical = canonicalizer.canonicalize(output.lines(), report_options());
    let expected = Sample::new(HOST_REPORT).fill(&["h1", "10.0.0.1"])?;
    expect_canonical(&canonical, &expected)?;

    reporter.artifacts().write_text("show_host.raw.txt", &output.text())?;
    reporter.artifacts().write_text("show_host.canonical.txt", canonical.as_str())?;
    reporter.finish(
        "pass",
        vec!["host report canonicalized to the expected literal".to_string()],
        vec!["show_host.raw.txt".to_string(), "show_host.canonical.txt".to_string()],
    )?;
    drop(reporter);
    Ok(())
}

#[test]
fn canonical_output_is_stable_across_launches() -> TestResult {
    let mut reporter = TestReporter::new("canonical_output_is_stable_across_launches")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let canonicalizer = fake.config("")?.build_canonicalizer()?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("stable", "192.168.1.7"))?)?;
    let show = render("host_show_one", &name_args("stable"))?;
    let first = executor.execute_with_retry(&show)?;
    let second = executor.execute_with_retry(&show)?;
    let first = canonicalizer.canonicalize(first.lines(), report_options());
    let second = canonicalizer.canonicalize(second.lines(), report_options());
    require_eq(first.as_str(), second.as_str(), "canonical reports differ between launches")?;

    reporter.finish(
        "pass",
        vec!["volatile identifiers and timestamps were suppressed".to_string()],
        Vec::new(),
    )?;
    drop(reporter);
    Ok(())
}

#[test]
fn tag_lines_follow_skip_tags() -> TestResult {
    let mut reporter = TestReporter::new("tag_lines_follow_skip_tags")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let canonicalizer = fake.config("")?.build_canonicalizer()?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let tag = CommandArgs::new()
        .with("name", "owner")
        .with("entityType", "host")
        .with("entityName", "h1")
        .with("value", "qa");
    executor.execute_with_retry(&render("tag_add", &tag)?)?;
    let output = executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?)?;

    let untagged = canonicalizer.canonicalize(output.lines(), report_options().with_skip_tags(true));
    expect_canonical(&untagged, &Sample::new(HOST_REPORT).fill(&["h1", "10.0.0.1"])?)?;

    let tagged = canonicalizer.canonicalize(output.lines(), report_options());
    expect_canonical(
        &tagged,
        "Name                 : h1\nHost                 : 10.0.0.1\nName                 : \
         ds::owner\nValue                : qa\n\nOK\n",
    )?;

    reporter.finish("pass", vec!["tag lines toggled by skip_tags".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn deleted_host_is_not_found_without_retry() -> TestResult {
    let mut reporter = TestReporter::new("deleted_host_is_not_found_without_retry")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    executor.execute_with_retry(&render("host_delete", &name_args("h1"))?)?;
    let calls_before = fake.state()?.calls;

    let Err(err) = executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?) else {
        return Err("showHost succeeded for a deleted host".into());
    };
    require_eq(&err.code(), &ErrorCode::ObjectNotFound, "deleted host classification")?;
    require_eq(&err.attempt(), &1, "deleted host attempts")?;
    require_eq(&fake.state()?.calls, &(calls_before + 1), "stub launches for fatal lookup")?;

    reporter.finish("pass", vec!["not-found lookups fail on the first attempt".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}
