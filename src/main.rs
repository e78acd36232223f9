use std::process::ExitCode;

fn main() -> ExitCode {
    autoref::cli::run()
}
