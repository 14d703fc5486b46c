// system-tests/tests/suites/reliability.rs
// ============================================================================
// Module: Reliability Tests
// Description: Retry and classification checks against the stub CLI.
// Purpose: Validate transient retries, attempt budgets, and fatal failures.
// Dependencies: system-tests helpers, fwcli-harness-core
// ============================================================================

//! ## Overview
//! Seeds the stub with metadata cache misses and worker warm-up delays and
//! counts process launches to confirm how many attempts the executor made.

use fwcli_harness_core::CanonicalizeOptions;
use fwcli_harness_core::Command;
use fwcli_harness_core::CommandArgs;
use fwcli_harness_core::DEFAULT_MAX_ATTEMPTS;
use fwcli_harness_core::ErrorCode;
use fwcli_harness_core::Executor;
use fwcli_harness_core::ProcessTransport;
use fwcli_harness_core::TransportError;
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

/// Arguments for `core_show_state`.
fn worker_args(worker: &str) -> CommandArgs {
    CommandArgs::new().with("worker", worker)
}

#[test]
fn cache_misses_are_retried_until_visible() -> TestResult {
    let mut reporter = TestReporter::new("cache_misses_are_retried_until_visible")?;
    let seed = FakeState {
        cache_misses_per_host: 3,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let output = executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?)?;
    require(output.text().ends_with("OK\n"), "report lacks trailing OK")?;
    require_eq(&fake.state()?.calls, &5, "one add plus three misses and one hit")?;

    reporter.finish("pass", vec!["three cache misses were absorbed".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn cache_miss_budget_exhausts_with_last_error() -> TestResult {
    let mut reporter = TestReporter::new("cache_miss_budget_exhausts_with_last_error")?;
    let seed = FakeState {
        cache_misses_per_host: 12,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let Err(err) = executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?) else {
        return Err("lookup succeeded despite exhausted budget".into());
    };
    require_eq(&err.code(), &ErrorCode::MetadataCacheMiss, "exhausted classification")?;
    require_eq(&err.attempt(), &DEFAULT_MAX_ATTEMPTS, "exhausted attempt")?;
    require(err.to_string().contains("is not in metadata cache"), "error lost tool message")?;
    require_eq(&fake.state()?.calls, &(1 + u64::from(DEFAULT_MAX_ATTEMPTS)), "stub launches")?;

    reporter.finish("pass", vec!["retry budget stopped at ten attempts".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn configured_attempt_budget_is_honored() -> TestResult {
    let mut reporter = TestReporter::new("configured_attempt_budget_is_honored")?;
    let seed = FakeState {
        cache_misses_per_host: 5,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let config = fake.config("[retry]\nmax_attempts = 2\n")?;
    let mut executor = Executor::new(config.build_transport())
        .with_classifier(config.build_classifier())
        .with_policy(config.build_retry_policy()?);

    executor.execute_with_retry(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let Err(err) = executor.execute_with_retry(&render("host_show_one", &name_args("h1"))?) else {
        return Err("lookup succeeded despite configured budget".into());
    };
    require_eq(&err.attempt(), &2, "configured attempt budget")?;
    require_eq(&fake.state()?.calls, &3, "stub launches")?;

    reporter.finish("pass", vec!["config retry budget applied".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn core_warmup_is_retried() -> TestResult {
    let mut reporter = TestReporter::new("core_warmup_is_retried")?;
    let seed = FakeState {
        warmup_after_start: 2,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let canonicalizer = fake.config("")?.build_canonicalizer()?;
    let mut executor = fake.executor();

    let start = render("core_start", &CommandArgs::new())?;
    require_eq(start.as_str(), "start -f", "core start rendering")?;
    executor.execute_with_retry(&start)?;
    let output = executor.execute_with_retry(&render("core_show_state", &worker_args("1"))?)?;
    require_eq(&fake.state()?.calls, &4, "one start plus two warm-up failures and one hit")?;

    let canonical = canonicalizer.canonicalize(output.lines(), CanonicalizeOptions::new());
    expect_canonical(&canonical, "Worker               : 1\nState                : Running\n\nOK\n")?;

    reporter.finish("pass", vec!["worker warm-up was absorbed".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn stopped_core_exhausts_worker_budget() -> TestResult {
    let mut reporter = TestReporter::new("stopped_core_exhausts_worker_budget")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let mut executor = fake.executor();

    executor.execute_with_retry(&render("core_stop", &CommandArgs::new())?)?;
    let Err(err) = executor.execute_with_retry(&render("core_show_state", &worker_args("1"))?) else {
        return Err("core state reported while stopped".into());
    };
    require_eq(&err.code(), &ErrorCode::WorkerNotReady, "stopped core classification")?;
    require_eq(&err.attempt(), &DEFAULT_MAX_ATTEMPTS, "stopped core attempts")?;

    reporter.finish("pass", vec!["worker budget exhausted while stopped".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn duplicate_add_is_fatal() -> TestResult {
    let mut reporter = TestReporter::new("duplicate_add_is_fatal")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let mut executor = fake.executor();
    let add = render("host_add", &host_args("h1", "10.0.0.1"))?;

    executor.execute_with_retry(&add)?;
    let Err(err) = executor.execute_with_retry(&add) else {
        return Err("duplicate add succeeded".into());
    };
    require_eq(&err.code(), &ErrorCode::AlreadyExists, "duplicate classification")?;
    require_eq(&err.attempt(), &1, "duplicate attempts")?;
    require_eq(&fake.state()?.calls, &2, "stub launches")?;

    reporter.finish("pass", vec!["duplicates fail without retry".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn plain_execute_does_not_retry() -> TestResult {
    let mut reporter = TestReporter::new("plain_execute_does_not_retry")?;
    let seed = FakeState {
        cache_misses_per_host: 2,
        ..FakeState::default()
    };
    let fake = FakeDscli::new(reporter.artifacts(), &seed)?;
    let mut executor = fake.executor();

    executor.execute(&render("host_add", &host_args("h1", "10.0.0.1"))?)?;
    let result = executor.execute(&render("host_show_one", &name_args("h1"))?);
    let Err(TransportError::Failed {
        stderr,
        ..
    }) = result
    else {
        return Err("single attempt did not surface the tool failure".into());
    };
    require(stderr.contains("is not in metadata cache"), "stderr lost tool message")?;
    require_eq(&fake.state()?.calls, &2, "stub launches")?;

    reporter.finish("pass", vec!["plain execute made one attempt".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn missing_executable_is_unavailable() -> TestResult {
    let mut reporter = TestReporter::new("missing_executable_is_unavailable")?;
    let missing = reporter.artifacts().root().join("no-such-dscli");
    let mut executor = Executor::new(ProcessTransport::new(missing));

    let Err(err) = executor.execute_with_retry(&Command::new("showHosts")) else {
        return Err("missing executable launched".into());
    };
    require_eq(&err.code(), &ErrorCode::ExecutableUnavailable, "spawn classification")?;
    require_eq(&err.attempt(), &1, "spawn attempts")?;

    reporter.finish("pass", vec!["launch failures are fatal".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}

#[test]
fn configured_signature_precedes_builtins() -> TestResult {
    let mut reporter = TestReporter::new("configured_signature_precedes_builtins")?;
    let fake = FakeDscli::new(reporter.artifacts(), &FakeState::default())?;
    let config = fake.config(
        "[[classifier.signatures]]\npattern = 'Unknown command'\ncode = 'invalid_arguments'\n",
    )?;
    let mut executor = Executor::new(config.build_transport()).with_classifier(config.build_classifier());

    let Err(err) = executor.execute_with_retry(&Command::new("teleport -name h1")) else {
        return Err("unknown verb succeeded".into());
    };
    require_eq(&err.code(), &ErrorCode::InvalidArguments, "configured classification")?;

    let mut builtin = fake.executor();
    let Err(err) = builtin.execute_with_retry(&Command::new("teleport -name h1")) else {
        return Err("unknown verb succeeded".into());
    };
    require_eq(&err.code(), &ErrorCode::Unknown, "builtin classification")?;

    reporter.finish("pass", vec!["config signatures extend the classifier".to_string()], Vec::new())?;
    drop(reporter);
    Ok(())
}
