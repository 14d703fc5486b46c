// crates/fwcli-harness-cli/src/main.rs
// ============================================================================
// Module: Firewall CLI Harness Entry Point
// Description: Command dispatcher for canonicalization, rendering, and execution.
// Purpose: Drive the harness pipeline from a shell without writing Rust tests.
// Dependencies: clap, fwcli-harness-core, serde, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The `fwcli-harness` binary exposes the harness pipeline to shell scripts:
//! canonicalize captured output, compare it with an expected literal, render
//! operation commands from the registry, and execute commands against the
//! configured firewall CLI with retry classification. All user-facing strings
//! are routed through the message catalog. Security posture: input files are
//! untrusted and read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use fwcli_harness_cli::t;
use fwcli_harness_core::ArgValue;
use fwcli_harness_core::CanonicalizeOptions;
use fwcli_harness_core::ClassifiedError;
use fwcli_harness_core::Command;
use fwcli_harness_core::CommandArgs;
use fwcli_harness_core::ConfigError;
use fwcli_harness_core::Executor;
use fwcli_harness_core::HarnessConfig;
use fwcli_harness_core::OperationDescriptor;
use fwcli_harness_core::OperationRegistry;
use fwcli_harness_core::ParamSpec;
use fwcli_harness_core::expect_canonical;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of captured output or expected-literal inputs.
const MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "fwcli-harness", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Canonicalize captured CLI output and print the result.
    Canonicalize(CanonicalizeCommand),
    /// Compare canonicalized output with an expected literal.
    Compare(CompareCommand),
    /// Render an operation into the command string it would send.
    Render(RenderCommand),
    /// List registered operations.
    Operations(OperationsCommand),
    /// Execute one command through the configured transport.
    Exec(ExecCommand),
}

/// Normalization switches shared by commands that canonicalize output.
#[derive(Args, Debug, Clone, Copy, Default)]
struct NormalizeArgs {
    /// Drop lines containing a `date time` timestamp.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_date: bool,
    /// Remove parenthesized annotations such as ` (local)`.
    #[arg(long, action = ArgAction::SetTrue)]
    cut_proxy: bool,
    /// Drop `Name : ds::*` and `Value : *` tag lines.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_tags: bool,
}

impl NormalizeArgs {
    /// Converts the switches into canonicalizer options.
    const fn options(self) -> CanonicalizeOptions {
        CanonicalizeOptions::new()
            .with_skip_date(self.skip_date)
            .with_cut_proxy(self.cut_proxy)
            .with_skip_tags(self.skip_tags)
    }
}

/// Arguments for `canonicalize`.
#[derive(Args, Debug)]
struct CanonicalizeCommand {
    /// Captured output file (defaults to stdin).
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Normalization switches.
    #[command(flatten)]
    normalize: NormalizeArgs,
    /// Harness config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Arguments for `compare`.
#[derive(Args, Debug)]
struct CompareCommand {
    /// File holding the expected canonical literal.
    #[arg(long, value_name = "FILE")]
    expected: PathBuf,
    /// Captured output file (defaults to stdin).
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Normalization switches.
    #[command(flatten)]
    normalize: NormalizeArgs,
    /// Harness config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Arguments for `render`.
#[derive(Args, Debug)]
struct RenderCommand {
    /// Registered operation name, e.g. `host_add`.
    operation: String,
    /// Argument as `KEY=VALUE`; repeatable.
    #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    args: Vec<(String, String)>,
    /// Flag parameter to switch on; repeatable.
    #[arg(long = "flag", value_name = "NAME")]
    flags: Vec<String>,
}

/// Arguments for `operations`.
#[derive(Args, Debug)]
struct OperationsCommand {
    /// Emit the registry as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Arguments for `exec`.
#[derive(Args, Debug)]
struct ExecCommand {
    /// Full command string, e.g. `showHost -name h1`.
    command: String,
    /// Retry while failures classify as transient.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "metadata")]
    retry: bool,
    /// Retry, and treat an empty result as "no entries".
    #[arg(long, action = ArgAction::SetTrue)]
    metadata: bool,
    /// Print raw output instead of canonical output.
    #[arg(long, action = ArgAction::SetTrue)]
    raw: bool,
    /// Normalization switches.
    #[command(flatten)]
    normalize: NormalizeArgs,
    /// Harness config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Execution entry point chosen by `exec` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecMode {
    /// Single attempt.
    Once,
    /// Retried attempt.
    Retry,
    /// Retried metadata lookup.
    Metadata,
}

impl ExecCommand {
    /// Resolves the execution mode from the flags.
    const fn mode(&self) -> ExecMode {
        if self.metadata {
            ExecMode::Metadata
        } else if self.retry {
            ExecMode::Retry
        } else {
            ExecMode::Once
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Creates a new CLI error with the provided message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Canonicalize(command) => command_canonicalize(&command),
        Commands::Compare(command) => command_compare(&command),
        Commands::Render(command) => command_render(&command),
        Commands::Operations(command) => command_operations(&command),
        Commands::Exec(command) => command_exec(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Canonicalization Commands
// ============================================================================

/// Canonicalizes captured output and prints it.
fn command_canonicalize(command: &CanonicalizeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let canonicalizer = config.build_canonicalizer().map_err(canonicalizer_error)?;
    let text = read_input(command.input.as_deref())?;
    let canonical = canonicalizer.canonicalize_text(&text, command.normalize.options());
    write_stdout_bytes(canonical.as_str().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Compares canonicalized output with an expected literal.
fn command_compare(command: &CompareCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let canonicalizer = config.build_canonicalizer().map_err(canonicalizer_error)?;
    let expected = read_input(Some(&command.expected))?;
    let text = read_input(command.input.as_deref())?;
    let actual = canonicalizer.canonicalize_text(&text, command.normalize.options());
    match expect_canonical(&actual, &expected) {
        Ok(()) => {
            write_stdout_line(&t!("compare.match", path = command.expected.display()))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(mismatch) => {
            write_stderr_line(&mismatch.to_string())
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ============================================================================
// SECTION: Registry Commands
// ============================================================================

/// Renders an operation into its command string.
fn command_render(command: &RenderCommand) -> CliResult<ExitCode> {
    let args = build_args(&command.args, &command.flags);
    let rendered = OperationRegistry::builtin()
        .render(&command.operation, &args)
        .map_err(|err| CliError::new(t!("render.failed", error = err)))?;
    write_stdout_line(rendered.as_str())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds operation arguments from `KEY=VALUE` pairs and flag names.
fn build_args(pairs: &[(String, String)], flags: &[String]) -> CommandArgs {
    let mut args = CommandArgs::new();
    for (key, value) in pairs {
        args.insert(key.clone(), ArgValue::parse_loose(value));
    }
    for flag in flags {
        args.insert(flag.clone(), true);
    }
    args
}

/// Parses a `KEY=VALUE` argument.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(t!("render.arg_invalid", value = raw)),
    }
}

/// JSON listing emitted by `operations --json`.
#[derive(Serialize)]
struct OperationListing<'a> {
    /// Number of registered operations.
    count: usize,
    /// Operations sorted by name.
    operations: Vec<&'a OperationDescriptor>,
}

/// Lists registered operations.
fn command_operations(command: &OperationsCommand) -> CliResult<ExitCode> {
    let registry = OperationRegistry::builtin();
    if command.json {
        let listing = OperationListing {
            count: registry.len(),
            operations: registry.iter().collect(),
        };
        let json = serde_json::to_string_pretty(&listing)
            .map_err(|err| CliError::new(t!("operations.json_failed", error = err)))?;
        write_stdout_line(&json).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    write_stdout_line(&t!("operations.header", count = registry.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    for operation in registry.iter() {
        let line = t!(
            "operations.entry",
            name = operation.name,
            command = operation.base_command,
            params = describe_params(&operation.params)
        );
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Summarizes a parameter schema, bracketing optional parameters.
fn describe_params(params: &[ParamSpec]) -> String {
    params
        .iter()
        .map(|param| {
            let entry = format!("{}:{}", param.cli_name, param.kind);
            if param.required { entry } else { format!("[{entry}]") }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// SECTION: Execution Commands
// ============================================================================

/// Executes one command through the configured transport.
fn command_exec(command: ExecCommand) -> CliResult<ExitCode> {
    let mode = command.mode();
    let config = load_config(command.config.as_deref())?;
    let policy = config.build_retry_policy().map_err(config_error)?;
    let audit = config.build_audit_sink().map_err(config_error)?;
    let canonicalizer = config.build_canonicalizer().map_err(canonicalizer_error)?;
    let mut executor = Executor::new(config.build_transport())
        .with_classifier(config.build_classifier())
        .with_policy(policy)
        .with_audit(audit);
    let target = Command::new(command.command);

    let output = match mode {
        ExecMode::Once => executor
            .execute(&target)
            .map_err(|err| CliError::new(t!("exec.failed", error = err)))?,
        ExecMode::Retry => executor.execute_with_retry(&target).map_err(classified_error)?,
        ExecMode::Metadata => {
            let Some(output) = executor.execute_metadata(&target).map_err(classified_error)?
            else {
                write_stderr_line(&t!("exec.metadata_empty"))
                    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
                return Ok(ExitCode::SUCCESS);
            };
            output
        }
    };

    let text = if command.raw {
        output.text()
    } else {
        canonicalizer.canonicalize(output.lines(), command.normalize.options()).into_string()
    };
    write_stdout_bytes(text.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats a classified execution failure.
fn classified_error(err: ClassifiedError) -> CliError {
    CliError::new(t!(
        "exec.failed_classified",
        attempt = err.attempt(),
        code = err.code(),
        error = err
    ))
}

// ============================================================================
// SECTION: Config Helpers
// ============================================================================

/// Loads the harness config from an explicit path or the default locations.
fn load_config(path: Option<&Path>) -> CliResult<HarnessConfig> {
    HarnessConfig::load(path).map_err(config_error)
}

/// Formats a config failure.
fn config_error(err: ConfigError) -> CliError {
    CliError::new(t!("config.load_failed", error = err))
}

/// Formats a canonicalizer construction failure.
fn canonicalizer_error(err: ConfigError) -> CliError {
    CliError::new(t!("canonicalizer.build_failed", error = err))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded reads.
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_reader_with_limit(file, max_bytes)
}

/// Reads any source to the end while enforcing a hard size limit.
fn read_reader_with_limit(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut limited = reader.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads UTF-8 text from `path`, or from stdin when no path is given.
fn read_input(path: Option<&Path>) -> CliResult<String> {
    let label = path.map_or_else(|| t!("input.stdin"), |path| path.display().to_string());
    let bytes = match path {
        Some(path) => read_bytes_with_limit(path, MAX_INPUT_BYTES),
        None => read_reader_with_limit(std::io::stdin(), MAX_INPUT_BYTES),
    }
    .map_err(|err| read_error(&label, err))?;
    String::from_utf8(bytes).map_err(|_| CliError::new(t!("input.not_utf8", path = label)))
}

/// Formats a bounded read failure.
fn read_error(label: &str, err: ReadLimitError) -> CliError {
    match err {
        ReadLimitError::Io(err) => CliError::new(t!("input.read_failed", path = label, error = err)),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!("input.too_large", path = label, size = size, limit = limit)),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
