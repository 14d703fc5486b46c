// system-tests/tests/helpers/fake.rs
// ============================================================================
// Module: Fake CLI Fixture
// Description: Per-test wiring of the `fake-dscli` stub into the harness.
// Purpose: Seed stub state and build transports, configs, and executors.
// Dependencies: system-tests, fwcli-harness-core
// ============================================================================

use std::error::Error;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use fwcli_harness_core::Command;
use fwcli_harness_core::CommandArgs;
use fwcli_harness_core::ConfigError;
use fwcli_harness_core::Executor;
use fwcli_harness_core::HarnessConfig;
use fwcli_harness_core::OperationRegistry;
use fwcli_harness_core::ProcessTransport;
use fwcli_harness_core::RegistryError;
use system_tests::fake::FakeError;
use system_tests::fake::FakeState;
use system_tests::fake::STATE_FLAG;

use super::artifacts::TestArtifacts;

/// Name of the stub state file inside a test's artifact root.
const STATE_FILE: &str = "dscli-state.json";

/// Stub CLI bound to one state file.
#[derive(Debug, Clone)]
pub struct FakeDscli {
    /// Stub executable path.
    executable: PathBuf,
    /// Absolute state file path.
    state_path: PathBuf,
}

impl FakeDscli {
    /// Seeds `initial` into the test's artifact root.
    pub fn new(artifacts: &TestArtifacts, initial: &FakeState) -> Result<Self, Box<dyn Error>> {
        let executable = artifacts
            .config()
            .fake_dscli
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_BIN_EXE_fake-dscli")));
        let state_path = fs::canonicalize(artifacts.root())?.join(STATE_FILE);
        initial.save(&state_path)?;
        Ok(Self {
            executable,
            state_path,
        })
    }

    /// Returns the stub executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Returns the state file path.
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Reads the current stub state.
    pub fn state(&self) -> Result<FakeState, FakeError> {
        FakeState::load(&self.state_path)
    }

    /// Process transport that launches the stub against this state file.
    pub fn transport(&self) -> ProcessTransport {
        ProcessTransport::new(&self.executable)
            .with_prefix_args([STATE_FLAG.to_string(), self.state_path.display().to_string()])
    }

    /// Executor with the built-in classifier and default retry budget.
    pub fn executor(&self) -> Executor<ProcessTransport> {
        Executor::new(self.transport())
    }

    /// Harness config pointing at the stub, followed by `extra` TOML.
    pub fn config(&self, extra: &str) -> Result<HarnessConfig, ConfigError> {
        let content = format!(
            "[transport]\nexecutable = '{}'\nargs = ['{STATE_FLAG}', '{}']\n\n{extra}",
            self.executable.display(),
            self.state_path.display(),
        );
        HarnessConfig::from_toml_str(&content)
    }
}

/// Renders a built-in registry operation.
pub fn render(operation: &str, args: &CommandArgs) -> Result<Command, RegistryError> {
    OperationRegistry::builtin().render(operation, args)
}

/// Arguments for `host_add`.
pub fn host_args(name: &str, address: &str) -> CommandArgs {
    CommandArgs::new().with("name", name).with("host", address)
}

/// Arguments naming a single object.
pub fn name_args(name: &str) -> CommandArgs {
    CommandArgs::new().with("name", name)
}
