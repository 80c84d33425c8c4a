use std::process::ExitCode;

use dist_explorer::app;

fn main() -> ExitCode {
    if let Err(err) = app::run() {
        eprintln!("dx: {err}");
        return ExitCode::from(err.exit_code());
    }
    ExitCode::SUCCESS
}
