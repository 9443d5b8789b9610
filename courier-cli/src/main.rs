//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use courier_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on standard error"
)]
fn main() {
    if let Err(err) = courier_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("courier: {err}");
        std::process::exit(1);
    }
}
