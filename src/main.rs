use clap::Parser;
use permafolio::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
