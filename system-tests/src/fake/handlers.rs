// system-tests/src/fake/handlers.rs
// ============================================================================
// Module: Fake CLI Command Handlers
// Description: Verb dispatch and output rendering for the stub firewall CLI.
// Purpose: Reproduce the tool's textual output and failure messages.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Handlers mimic the real tool's report layout: padded `Label : value`
//! lines, volatile identifiers and timestamps, ` (local)` address
//! annotations, `ds::` tag lines, and a trailing `OK`. Failures print the
//! tool's own messages so harness classification sees realistic text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write;

use super::FakeError;
use super::state::FakeState;
use super::state::HostRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Process-level reply of one stub invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text for standard output.
    pub stdout: String,
    /// Text for standard error.
    pub stderr: String,
    /// Process exit code.
    pub exit_code: u8,
}

impl Reply {
    /// Successful reply.
    fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Failed reply carrying a tool message.
    fn fail(message: impl Into<String>) -> Self {
        let mut stderr = message.into();
        stderr.push('\n');
        Self {
            stdout: String::new(),
            stderr,
            exit_code: 1,
        }
    }
}

/// Parsed command line of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command verb, e.g. `addHost`.
    pub verb: String,
    /// Switches without their leading dash; bare switches map to `None`.
    pub params: BTreeMap<String, Option<String>>,
}

impl Invocation {
    /// Parses `verb -key value -flag ...` tokens.
    ///
    /// # Errors
    ///
    /// Returns [`FakeError::Usage`] when the verb is missing or a value has
    /// no preceding switch.
    pub fn parse(tokens: &[String]) -> Result<Self, FakeError> {
        let (verb, rest) =
            tokens.split_first().ok_or_else(|| FakeError::Usage("missing command".to_string()))?;
        let mut params = BTreeMap::new();
        let mut index = 0;
        while index < rest.len() {
            let Some(key) = rest[index].strip_prefix('-') else {
                return Err(FakeError::Usage(format!("unexpected value '{}'", rest[index])));
            };
            let value = rest.get(index + 1).filter(|next| !next.starts_with('-')).cloned();
            index += if value.is_some() { 2 } else { 1 };
            params.insert(key.to_string(), value);
        }
        Ok(Self {
            verb: verb.clone(),
            params,
        })
    }

    /// Returns a required switch value.
    fn required(&self, key: &str) -> Result<&str, Reply> {
        self.params
            .get(key)
            .and_then(Option::as_deref)
            .ok_or_else(|| Reply::fail(format!("Missing required parameter: -{key}")))
    }

    /// Returns an optional switch value.
    fn optional(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Option::as_deref)
    }
}

/// Values that change on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volatile {
    /// Current timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub now: String,
    /// Random backend identifier.
    pub backend: u32,
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs one invocation against `state`.
pub fn dispatch(state: &mut FakeState, invocation: &Invocation, volatile: &Volatile) -> Reply {
    let result = match invocation.verb.as_str() {
        "addHost" => add_host(state, invocation, volatile),
        "showHost" => show_host(state, invocation, volatile),
        "showHosts" => Ok(show_hosts(state)),
        "delHost" => delete_host(state, invocation),
        "addTag" => add_tag(state, invocation),
        "start" | "restart" => Ok(start_core(state)),
        "stop" => {
            state.core_running = false;
            Ok(Reply::ok("OK\n"))
        }
        "showCoreState" => show_core_state(state, invocation, volatile),
        other => Err(Reply::fail(format!("Unknown command: {other}"))),
    };
    result.unwrap_or_else(|reply| reply)
}

// ============================================================================
// SECTION: Hosts
// ============================================================================

/// `addHost -name N -host A`
fn add_host(
    state: &mut FakeState,
    invocation: &Invocation,
    volatile: &Volatile,
) -> Result<Reply, Reply> {
    let name = invocation.required("name")?;
    let address = invocation.required("host")?;
    if state.hosts.contains_key(name) {
        return Err(Reply::fail(format!("There's already a Host with the name {name}")));
    }
    let id = state.allocate_id();
    let record = HostRecord {
        id,
        address: address.to_string(),
        created: volatile.now.clone(),
        pending_misses: state.cache_misses_per_host,
        tags: BTreeMap::new(),
    };
    state.hosts.insert(name.to_string(), record);
    Ok(Reply::ok("OK\n"))
}

/// `showHost -name N`
fn show_host(
    state: &mut FakeState,
    invocation: &Invocation,
    volatile: &Volatile,
) -> Result<Reply, Reply> {
    let name = invocation.required("name")?;
    let record = state
        .hosts
        .get_mut(name)
        .ok_or_else(|| Reply::fail(format!("There isn't such Host: {name}")))?;
    if record.pending_misses > 0 {
        record.pending_misses -= 1;
        return Err(Reply::fail(format!("Error: Host {name} is not in metadata cache")));
    }
    let mut out = String::new();
    field(&mut out, "ID", &record.id.to_string());
    field(&mut out, "Name", name);
    field(&mut out, "Host", &format!("{} (local)", record.address));
    field(&mut out, "Created", &record.created);
    field(&mut out, "Backend", &volatile.backend.to_string());
    for (tag, value) in &record.tags {
        field(&mut out, "Name", &format!("ds::{tag}"));
        field(&mut out, "Value", value);
    }
    out.push_str("\nOK\n");
    Ok(Reply::ok(out))
}

/// `showHosts`; prints nothing when no host is visible.
fn show_hosts(state: &FakeState) -> Reply {
    let mut out = String::new();
    for (name, record) in state.hosts.iter().filter(|(_, record)| record.pending_misses == 0) {
        field(&mut out, "ID", &record.id.to_string());
        field(&mut out, "Name", name);
        field(&mut out, "Host", &format!("{} (local)", record.address));
        out.push('\n');
    }
    if !out.is_empty() {
        out.push_str("OK\n");
    }
    Reply::ok(out)
}

/// `delHost -name N`
fn delete_host(state: &mut FakeState, invocation: &Invocation) -> Result<Reply, Reply> {
    let name = invocation.required("name")?;
    state
        .hosts
        .remove(name)
        .map(|_| Reply::ok("OK\n"))
        .ok_or_else(|| Reply::fail(format!("There isn't such Host: {name}")))
}

/// `addTag -name T -entityType host -entityName N [-value V]`
fn add_tag(state: &mut FakeState, invocation: &Invocation) -> Result<Reply, Reply> {
    let name = invocation.required("name")?;
    let entity_type = invocation.required("entityType")?;
    let entity_name = invocation.required("entityName")?;
    if !entity_type.eq_ignore_ascii_case("host") {
        return Err(Reply::fail(format!("Invalid value for -entityType: {entity_type}")));
    }
    let record = state
        .hosts
        .get_mut(entity_name)
        .ok_or_else(|| Reply::fail(format!("There isn't such Host: {entity_name}")))?;
    let value = invocation.optional("value").unwrap_or("none");
    record.tags.insert(name.to_string(), value.to_string());
    Ok(Reply::ok("OK\n"))
}

// ============================================================================
// SECTION: Core
// ============================================================================

/// `start [-f]` and `restart [-f]`
fn start_core(state: &mut FakeState) -> Reply {
    state.core_running = true;
    state.worker_warmup = state.warmup_after_start;
    Reply::ok("OK\n")
}

/// `showCoreState -worker W`
fn show_core_state(
    state: &mut FakeState,
    invocation: &Invocation,
    volatile: &Volatile,
) -> Result<Reply, Reply> {
    let worker = invocation.required("worker")?;
    if !state.core_running {
        return Err(Reply::fail(format!("Worker is not started ({worker})")));
    }
    if state.worker_warmup > 0 {
        state.worker_warmup -= 1;
        return Err(Reply::fail(format!("Worker is not started ({worker})")));
    }
    let mut out = String::new();
    field(&mut out, "Worker", worker);
    field(&mut out, "State", "Running");
    field(&mut out, "Starting Time", &volatile.now);
    out.push_str("\nOK\n");
    Ok(Reply::ok(out))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Appends one padded report line; values carry the tool's trailing padding.
fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:<21}: {value:<12}");
}
