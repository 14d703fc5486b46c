// system-tests/tests/suites/metadata.rs
// ============================================================================
// Module: Metadata Tests
// Description: Metadata lookups and execution audit logging.
// Purpose: Validate empty-listing semantics and the file audit sink.
// Dependencies: system-tests helpers, fwcli-harness-core, serde_json
// ============================================================================

//! ## Overview
//! Metadata lookups treat an empty listing as a valid answer. The audit test
//! routes executor events to a JSON-lines file through the harness config.

use std::fs;

use fwcli_harness_core::CanonicalizeOptions;
use fwcli_harness_core::CommandArgs;
use fwcli_harness_core::Executor;
use fwcli_harness_core::expect_canonical;
use helpers::artifacts::TestReporter;
use helpers::checks::TestResult;
use helpers::checks::require;
use helpers::checks::require_eq;
use helpers::fake::FakeDscli;
use helpers::fake::host_args;
use helpers::fake::name_args;
use helpers::fake::render;
use serde_json::Value;
use system_tests::fake::FakeState;

use crate::helpers;

#[test]
fn empty_listing_is_none() -> TestResult {
    let mut reporter = TestReporter::new("empty_listing_is_none")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let mut executor = fake.executor();

    let listing = executor.execute_metadata(&render("host_show_all", &CommandArgs::new())?)?;
    require(listing.is_none(), "empty listing returned output")?;
    require_eq(&fake.state()?.calls, &1, "stub launches")?;

    reporter.finish("pass", vec!["empty listing ended without polling".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn listing_returns_visible_hosts() -> TestResult {
    let mut reporter = TestReporter::new("listing_returns_visible_hosts")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let canonicalizer = fake.config("")?.build_canonicalizer()?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let Some(listing) = executor.execute_metadata(&render("host_show_all", &CommandArgs::new())?)? else {
        return Err("listing was empty after add".into());
    };
    let canonical =
        canonicalizer.canonicalize(listing.lines(), CanonicalizeOptions::new().with_cut_proxy(true));
    expect_canonical(&canonical, "Name                 : h1\nHost                 : 10.0.0.1\n\nOK\n")?;

    reporter.finish("pass", vec!["listing carried the new host".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn hidden_hosts_yield_none_without_polling() -> TestResult {
    let mut reporter = TestReporter::new("hidden_hosts_yield_none_without_polling")?;
    let seed = FakeState {
        cache_misses_per_host: 1,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let listing = executor.execute_metadata(&render("host_show_all", &CommandArgs::new())?)?;
    require(listing.is_none(), "hidden host was listed")?;
    require_eq(&fake.state()?.calls, &2, "stub launches")?;

    reporter.finish("pass", vec!["empty success is not retried".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn file_audit_sink_records_retries() -> TestResult {
    let mut reporter = TestReporter::new("file_audit_sink_records_retries")?;
    let seed = FakeState {
        cache_misses_per_host: 1,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let audit_path = fake.state_path().with_file_name("audit.jsonl");
    let config = fake.config(&format!("[audit]\nmode = 'file'\npath = '{}'\n", audit_path.display()))?;
    let mut executor = Executor::new(config.build_transport())
        .with_classifier(config.build_classifier())
        .with_policy(config.build_retry_policy()?)
        .with_audit(config.build_audit_sink()?);

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?)?;

    let log = fs::read_to_string(&audit_path)?;
    let events = log.lines().map(serde_json::from_str).collect::<Result<Vec<Value>, _>>()?;
    let names: Vec<&str> = events.iter().filter_map(|event| event["event"].as_str()).collect();
    require_eq(
        names.join(",").as_str(),
        "command_attempt,command_succeeded,command_attempt,command_retry,command_attempt,\
         command_succeeded",
        "audit event sequence",
    )?;
    let retry = events
        .iter()
        .find(|event| event["event"] == "command_retry")
        .ok_or("missing retry event")?;
    require_eq(retry["outcome"].as_str().unwrap_or_default(), "retry", "retry outcome")?;
    require_eq(
        retry["error_code"].as_str().unwrap_or_default(),
        "metadata_cache_miss",
        "retry error code",
    )?;
    require_eq(retry["command"].as_str().unwrap_or_default(), "showHost -name h1", "retry command")?;

    reporter.finish(
        "pass",
        vec!["audit log captured the retried lookup".to_string()],
        vec!["audit.jsonl".to_string()],
    )?;
    drop(reporter);
    Ok(())
}
