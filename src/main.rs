use anyhow::Result;
use clap::Parser;
use cyclewatch::showcase;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Cyclewatch - cross-language deadlock detector with visualization support"
)]
struct Cli {
    /// Path to the log file to showcase
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    showcase::showcase(cli.log_file)?;
    Ok(())
}
