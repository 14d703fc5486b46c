// system-tests/src/bin/fake_dscli.rs
// ============================================================================
// Module: Fake Firewall CLI Binary
// Description: Process entry point for the stub firewall CLI.
// Purpose: Provide a launchable tool for process-transport system tests.
// Dependencies: system-tests
// ============================================================================

//! Stub firewall CLI binary for system-tests.

use std::io::Write;
use std::process::ExitCode;

use system_tests::fake::USAGE_EXIT_CODE;
use system_tests::fake::run;
use system_tests::fake::sample_volatile;

/// Runs one stub invocation and mirrors its reply onto the process streams.
fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    match sample_volatile().and_then(|volatile| run(&args, &volatile)) {
        Ok(reply) => {
            let _ = stdout.write_all(reply.stdout.as_bytes());
            let _ = stderr.write_all(reply.stderr.as_bytes());
            ExitCode::from(reply.exit_code)
        }
        Err(err) => {
            let _ = writeln!(stderr, "{err}");
            ExitCode::from(USAGE_EXIT_CODE)
        }
    }
}
