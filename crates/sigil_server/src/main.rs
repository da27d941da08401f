//! SIGIL Server
//!
//! HTTP API server for certificate issuance and verification.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::Result;
use clap::Parser;
use sigil_certify::{CertificateAuthority, init_signer};
use sigil_server::{AppState, router};
use sigil_store::RedbStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sigil-server")]
#[command(about = "SIGIL certificate server", long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Certificate store path
    #[arg(long, default_value = "certs.redb")]
    store: PathBuf,

    /// Signing key file (generated on first run if absent)
    #[arg(long, default_value = "signing_key.base64")]
    key_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter("sigil=debug,tower_http=debug")
        .init();

    let signer = init_signer(&args.key_file)?;
    let authority = CertificateAuthority::new(signer);
    tracing::info!(public_key = %authority.public_key_base64(), "signing key loaded");

    let store = Arc::new(RedbStore::open(&args.store)?);
    let state = Arc::new(AppState::new(authority, store));

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(bind = %args.bind, "listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
