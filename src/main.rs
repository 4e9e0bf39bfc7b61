use clap::Parser;
use kalmantrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
