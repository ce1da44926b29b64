//! MLO Compact - Main Entry Point
//!
//! Thin command-line wrapper around the `mlo_compact` library.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Compact a MyLifeOrganized XML export by removing completed and dropped tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the MLO XML export to read
    input: PathBuf,

    /// Path to write the compacted XML to
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    mlo_compact::run(&args.input, &args.output)?;
    println!(
        "Successfully compacted '{}' to '{}'",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
