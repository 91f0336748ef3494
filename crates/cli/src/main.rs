use std::io;

use anyhow::Context;
use clap::Parser;

use revsense_cli::{Cli, run};
use revsense_infra::RevsenseConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = RevsenseConfig::from_env().context("invalid configuration")?;
    revsense_observability::init(config.log_format);

    let stdout = io::stdout();
    run(&config, cli.command, &mut stdout.lock())
}
