// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Per-test artifact directories and run summaries.
// Purpose: Keep raw and canonical tool output for inspection after a run.
// Dependencies: system-tests, serde, serde_json
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Summary written to `summary.json` when a test ends.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    /// Test name.
    test: &'a str,
    /// `pass`, `panic`, or `unfinished`.
    status: &'a str,
    /// Wall-clock duration in milliseconds.
    duration_ms: u128,
    /// Notes recorded by the test.
    notes: &'a [String],
    /// Files written below the test directory.
    artifacts: &'a [String],
}

/// Milliseconds since the Unix epoch.
fn epoch_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Artifact directory for a single system-test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    /// Test directory.
    root: PathBuf,
    /// Environment-derived system-test config.
    config: SystemTestConfig,
}

impl TestArtifacts {
    /// Creates the test directory.
    ///
    /// With `FWCLI_SYSTEM_TEST_RUN_ROOT` set the directory is
    /// `<run_root>/<test_name>` and must not exist unless overwriting is
    /// allowed. Otherwise a fresh directory below `target/system-tests` is
    /// used.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = if let Some(run_root) = &config.run_root {
            let root = run_root.join(test_name);
            if root.exists() && !config.allow_overwrite {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists; set FWCLI_SYSTEM_TEST_ALLOW_OVERWRITE=1", root.display()),
                ));
            }
            root
        } else {
            PathBuf::from("target/system-tests")
                .join(format!("run_{}_{}", epoch_millis(), std::process::id()))
                .join(test_name)
        };
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            config,
        })
    }

    /// Returns the test directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the config the directory was derived from.
    pub const fn config(&self) -> &SystemTestConfig {
        &self.config
    }

    /// Writes a UTF-8 text artifact.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value)?;
        Ok(path)
    }
}

/// Writes `summary.json` when finished, or with a failure status on drop.
pub struct TestReporter {
    /// Test directory.
    artifacts: TestArtifacts,
    /// Test name.
    test_name: String,
    /// Start time in milliseconds since epoch.
    started_at_ms: u128,
    /// Whether a summary has been written.
    finished: bool,
}

impl TestReporter {
    /// Creates a reporter and its test directory.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: epoch_millis(),
            finished: false,
        })
    }

    /// Returns the test directory.
    pub const fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes the summary.
    pub fn finish(&mut self, status: &str, notes: Vec<String>, artifacts: Vec<String>) -> io::Result<()> {
        let summary = RunSummary {
            test: &self.test_name,
            status,
            duration_ms: epoch_millis().saturating_sub(self.started_at_ms),
            notes: &notes,
            artifacts: &artifacts,
        };
        let json = serde_json::to_string_pretty(&summary).map_err(io::Error::other)?;
        self.artifacts.write_text("summary.json", &json)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.finished {
            let status = if std::thread::panicking() { "panic" } else { "unfinished" };
            let _ = self.finish(status, Vec::new(), Vec::new());
        }
    }
}
