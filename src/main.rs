//! seal_file: seal a file into a vault zone with a SHA-256 digest, a PDF certificate and a ledger entry.

mod certificate;
mod digest;
mod ledger;
mod seal;
mod zone;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seal_file")]
#[command(about = "Seal a file into a vault zone with SHA-256, a certificate and a ledger entry")]
struct Cli {
    /// Path to the file to seal.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Vault zone to store the file in.
    #[arg(long, value_enum, default_value_t = zone::Zone::Public)]
    zone: zone::Zone,

    /// Human-readable title recorded on the certificate and in the ledger.
    #[arg(long, default_value = "Untitled Artifact")]
    title: String,

    /// Person or entity sealing this file.
    #[arg(long)]
    actor: String,

    /// Vault root holding the zone, certificates and registry directories.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Log each step to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "seal_file=debug" } else { "seal_file=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = seal::run(&seal::SealRequest {
        source: cli.file,
        zone: cli.zone,
        title: cli.title,
        actor: cli.actor,
        root: cli.root,
    })?;

    println!("{} {}", "Sealed:".green(), outcome.artifact_path.display());
    println!("{} {}", "Certificate:".green(), outcome.certificate_path.display());
    println!(
        "{} {} ({} entries)",
        "Ledger updated:".green(),
        outcome.ledger_path.display(),
        outcome.ledger_len
    );
    println!("{} {}", "SHA-256:".bold(), outcome.record.id);
    Ok(())
}
