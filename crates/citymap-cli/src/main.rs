use anyhow::Result;
use citymap_cli::{run, telemetry, Cli};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_level, cli.log_json);

    let output = run(&cli)?;
    println!("{output}");
    Ok(())
}
