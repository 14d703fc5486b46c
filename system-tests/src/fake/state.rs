// system-tests/src/fake/state.rs
// ============================================================================
// Module: Fake CLI State
// Description: Persistent object store backing the stub firewall CLI.
// Purpose: Carry hosts, tags, and fault budgets across process launches.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every invocation of the stub loads this state from a JSON file, mutates it,
//! and writes it back. Fault budgets model the metadata cache and worker
//! warm-up delays of the real tool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use super::FakeError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One registered host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostRecord {
    /// Server-assigned identifier.
    pub id: u64,
    /// Host address.
    pub address: String,
    /// Creation timestamp as printed by the tool.
    pub created: String,
    /// Lookups that still report a metadata cache miss.
    pub pending_misses: u32,
    /// Tags attached to the host, by tag name.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Full stub state.
///
/// # Invariants
/// - `next_id` is strictly greater than every assigned host id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FakeState {
    /// Metadata cache misses every new host reports before it is visible.
    #[serde(default)]
    pub cache_misses_per_host: u32,
    /// Warm-up failures applied to core state queries after each start.
    #[serde(default)]
    pub warmup_after_start: u32,
    /// Remaining warm-up failures.
    #[serde(default)]
    pub worker_warmup: u32,
    /// Whether the core is running.
    #[serde(default = "default_running")]
    pub core_running: bool,
    /// Next host identifier.
    #[serde(default = "default_next_id")]
    pub next_id: u64,
    /// Hosts by name.
    #[serde(default)]
    pub hosts: BTreeMap<String, HostRecord>,
    /// Number of invocations handled so far.
    #[serde(default)]
    pub calls: u64,
}

/// Serde default for [`FakeState::core_running`].
const fn default_running() -> bool {
    true
}

/// Serde default for [`FakeState::next_id`].
const fn default_next_id() -> u64 {
    1
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            cache_misses_per_host: 0,
            warmup_after_start: 0,
            worker_warmup: 0,
            core_running: default_running(),
            next_id: default_next_id(),
            hosts: BTreeMap::new(),
            calls: 0,
        }
    }
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

impl FakeState {
    /// Loads state from `path`; a missing file yields the default state.
    ///
    /// # Errors
    ///
    /// Returns [`FakeError::State`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, FakeError> {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| FakeError::State(format!("{}: {err}", path.display()))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(FakeError::State(format!("{}: {err}", path.display()))),
        }
    }

    /// Writes state to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FakeError::State`] when serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), FakeError> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|err| FakeError::State(format!("encode state: {err}")))?;
        fs::write(path, bytes).map_err(|err| FakeError::State(format!("{}: {err}", path.display())))
    }

    /// Allocates the next host identifier.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
