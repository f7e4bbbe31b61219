//! Dropzone CLI: inspect a mapping configuration file without starting the server.

use clap::Parser;
use dropzone_cli::{init_tracing, run, Cli};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = run(&cli.command)?;
    println!("{}", output);

    Ok(())
}
