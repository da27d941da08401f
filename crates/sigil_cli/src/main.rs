//! SIGIL CLI
//!
//! Operator command-line interface: issue, verify, revoke, and export
//! certificates against a local store.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use sigil_certify::{CertificateAuthority, CertificateExport, VerifyOutcome, init_signer};
use sigil_core::{CertId, CertificateDraft};
use sigil_store::{RecordStore, RedbStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sigil")]
#[command(about = "SIGIL - signed completion certificates", long_about = None)]
struct Cli {
    /// Certificate store path
    #[arg(long, global = true, default_value = "certs.redb")]
    store: PathBuf,

    /// Signing key file (generated on first run if absent)
    #[arg(long, global = true, default_value = "signing_key.base64")]
    key_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a certificate
    Issue {
        /// Recipient name
        #[arg(short, long)]
        name: String,
        /// Course title
        #[arg(short, long, default_value = "")]
        course: String,
        /// Cohort label
        #[arg(long, default_value = "")]
        cohort: String,
    },
    /// Verify a stored certificate by ID
    Verify {
        /// Certificate ID
        id: String,
    },
    /// Verify an exported certificate file
    VerifyFile {
        /// Path to an exported certificate JSON file
        file: PathBuf,
    },
    /// Revoke a certificate
    Revoke {
        /// Certificate ID
        id: String,
    },
    /// Reinstate a revoked certificate
    Unrevoke {
        /// Certificate ID
        id: String,
    },
    /// List all certificates
    List,
    /// Show issuance statistics
    Stats,
    /// Export a certificate for offline verification
    Export {
        /// Certificate ID
        id: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the published verification key
    PublicKey,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let authority = CertificateAuthority::new(init_signer(&cli.key_file)?);
    let store = RedbStore::open(&cli.store)?;

    match cli.command {
        Commands::Issue {
            name,
            course,
            cohort,
        } => {
            let draft = CertificateDraft::new(&name, &course, &cohort)?;
            let stored = authority.issue(&store, draft)?;
            println!("Certificate issued");
            println!("  id:        {}", stored.id());
            println!("  name:      {}", stored.record.name);
            println!("  course:    {}", stored.record.course);
            println!("  cohort:    {}", stored.record.cohort);
            println!("  issued_at: {}", stored.record.issued_at);
            println!("  signature: {}", stored.signature);
            Ok(())
        }
        Commands::Verify { id } => {
            let outcome = match id.parse::<CertId>() {
                Ok(id) => authority.verify_stored(&store, &id)?,
                Err(_) => VerifyOutcome::NotFound,
            };
            report(outcome)
        }
        Commands::VerifyFile { file } => {
            let json = std::fs::read_to_string(&file)?;
            let export = CertificateExport::from_json(&json)?;
            let outcome = authority.verify_export(&store, &export)?;
            report(outcome)
        }
        Commands::Revoke { id } => {
            let id: CertId = id.parse()?;
            store.set_revoked(&id, true)?;
            println!("Certificate {id} revoked");
            Ok(())
        }
        Commands::Unrevoke { id } => {
            let id: CertId = id.parse()?;
            store.set_revoked(&id, false)?;
            println!("Certificate {id} reinstated");
            Ok(())
        }
        Commands::List => {
            for cert in store.list()? {
                let status = if cert.revoked { "revoked" } else { "active" };
                println!(
                    "{}  {:7}  {}  {} / {}",
                    cert.id(),
                    status,
                    cert.record.issued_at,
                    cert.record.name,
                    cert.record.course
                );
            }
            Ok(())
        }
        Commands::Stats => {
            let stats = store.stats()?;
            println!("total:   {}", stats.total);
            println!("active:  {}", stats.active);
            println!("revoked: {}", stats.revoked);
            Ok(())
        }
        Commands::Export { id, output } => {
            let id: CertId = id.parse()?;
            let stored = store
                .get(&id)?
                .ok_or_else(|| color_eyre::eyre::eyre!("certificate not found: {id}"))?;
            let json = CertificateExport::from_stored(&stored).to_json_pretty()?;
            match output {
                Some(path) => std::fs::write(&path, json)?,
                None => println!("{json}"),
            }
            Ok(())
        }
        Commands::PublicKey => {
            println!("{}", authority.public_key_base64());
            Ok(())
        }
    }
}

/// Print the outcome; a tampered certificate fails the process.
fn report(outcome: VerifyOutcome) -> Result<()> {
    println!("{}: {}", outcome, outcome.message());
    if outcome == VerifyOutcome::Tampered {
        std::process::exit(1);
    }
    Ok(())
}
