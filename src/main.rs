use anyhow::Result;
use clap::{Parser, Subcommand};
use codaln::pipeline::{self, args::AlignArgs};

#[derive(Parser)]
#[command(name = "codaln")]
#[command(version = "0.1.0")]
#[command(about = "Codon-aware alignment against an annotated reference genome", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align nucleotide queries against the annotated reference
    Align(AlignArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Align(args) => {
            pipeline::run(args)?;
        }
    }
    Ok(())
}
