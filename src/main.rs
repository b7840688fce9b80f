//! CLI entry point for replaying storage scenarios and fuzzing the partition

use clap::Parser;
use patchstore::io::cli::{Cli, ScenarioRunner};

fn main() -> patchstore::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let mut runner = ScenarioRunner::new(cli);
    let stdout = std::io::stdout();
    runner.run(&mut stdout.lock())
}
