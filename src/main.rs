//! Binary entrypoint for the whiteboard server.

use std::process::ExitCode;

use whiteboard::start_whiteboard;

/// Read configuration from the environment and serve until Ctrl-C.
fn main() -> ExitCode {
    start_whiteboard::run()
}
