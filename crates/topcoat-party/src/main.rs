//! Topcoat Party CLI
//!
//! Command-line interface for running one side of the two-party protocol:
//! - Distributed Key Generation
//! - Distributed Signing
//! - Verification

mod key_file;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use key_file::KeyFile;
use peer_link::TcpTransport;
use rand::RngCore;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use topcoat_core::keygen::run_keygen;
use topcoat_core::sign::run_sign;
use topcoat_core::{verify, verify_bytes, MemoryTransport, Outcome, ParameterSet, Signature};
use tracing::{info, Level};

/// Topcoat Party - two-party lattice signing node
#[derive(Parser)]
#[command(name = "topcoat-party")]
#[command(about = "Two-party post-quantum threshold signing node")]
#[command(version)]
struct Cli {
    /// Party label, used in logs and key file names
    #[arg(short, long, env = "PARTY_LABEL", default_value = "alice")]
    label: String,

    /// Data directory for key shares
    #[arg(short, long, env = "DEST", default_value = "./data")]
    dest: PathBuf,

    /// JSON parameter file (defaults to the recommended set)
    #[arg(short, long, env = "TOPCOAT_PARAMS")]
    params: Option<PathBuf>,

    /// Seconds to wait for each peer message
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PeerArgs {
    /// Address to accept the peer on
    #[arg(long)]
    listen: Option<String>,

    /// Address of a listening peer
    #[arg(long)]
    connect: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run distributed key generation
    Keygen {
        #[command(flatten)]
        peer: PeerArgs,
    },

    /// Sign a message together with the peer
    Sign {
        /// Message to sign (hex encoded)
        #[arg(short, long)]
        message: String,

        #[command(flatten)]
        peer: PeerArgs,
    },

    /// Verify a signature under the stored public key
    Verify {
        /// Signed message (hex encoded)
        #[arg(short, long)]
        message: String,

        /// Signature (hex encoded)
        #[arg(short, long)]
        signature: String,
    },

    /// Show key share info
    Info,

    /// Run both parties in-process and cross-verify the results
    Demo {
        /// Message to sign (hex encoded, random if omitted)
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen { peer } => cmd_keygen(&cli, peer).await?,
        Commands::Sign { message, peer } => cmd_sign(&cli, message, peer).await?,
        Commands::Verify { message, signature } => cmd_verify(&cli, message, signature)?,
        Commands::Info => cmd_info(&cli)?,
        Commands::Demo { message } => cmd_demo(&cli, message.as_deref()).await?,
    }

    Ok(())
}

fn load_params(cli: &Cli) -> Result<ParameterSet> {
    Ok(match &cli.params {
        Some(path) => ParameterSet::load(path)?,
        None => ParameterSet::recommended(),
    })
}

async fn open_transport(cli: &Cli, peer: &PeerArgs) -> Result<TcpTransport> {
    let transport = match (&peer.listen, &peer.connect) {
        (Some(addr), _) => {
            let listener = TcpListener::bind(addr).await?;
            info!(addr = %addr, "Waiting for peer");
            TcpTransport::accept(&listener).await?
        }
        (None, Some(addr)) => TcpTransport::connect_with_retry(addr, 50).await?,
        (None, None) => bail!("either --listen or --connect is required"),
    };
    Ok(transport.with_timeout(Duration::from_secs(cli.timeout)))
}

fn completed<T>(outcome: Outcome<T>, what: &str) -> Result<T> {
    match outcome {
        Outcome::Completed(value) => Ok(value),
        Outcome::Aborted(reason) => bail!("{} aborted: {}", what, reason),
    }
}

async fn cmd_keygen(cli: &Cli, peer: &PeerArgs) -> Result<()> {
    let params = load_params(cli)?;
    let transport = open_transport(cli, peer).await?;

    let key_pair = completed(run_keygen(&params, &transport, &cli.label).await?, "keygen")?;

    let key_file = KeyFile::new(&cli.label, &params, &key_pair);
    let path = key_file.save(&cli.dest)?;
    info!(path = ?path, "Keygen completed, key share saved");

    println!("Public Key: {}", key_file.public_key);
    Ok(())
}

async fn cmd_sign(cli: &Cli, message: &str, peer: &PeerArgs) -> Result<()> {
    let key_file = KeyFile::load(&cli.dest, &cli.label)?;
    let public_key = key_file.public_key()?;
    let share = key_file.share()?;
    let message = hex::decode(message)?;

    let transport = open_transport(cli, peer).await?;
    let signature = completed(
        run_sign(
            &key_file.params,
            &transport,
            &public_key,
            &share,
            &message,
            &cli.label,
        )
        .await?,
        "signing",
    )?;

    info!(iterations = signature.iterations, "Signature generated");
    println!("Signature: {}", hex::encode(signature.to_bytes()));
    Ok(())
}

fn cmd_verify(cli: &Cli, message: &str, signature: &str) -> Result<()> {
    let key_file = KeyFile::load(&cli.dest, &cli.label)?;
    let public_key = key_file.public_key()?;
    let message = hex::decode(message)?;
    let signature = hex::decode(signature)?;

    if !verify_bytes(&key_file.params, &message, &signature, &public_key) {
        bail!("signature is invalid");
    }
    println!("Signature is valid");
    Ok(())
}

fn cmd_info(cli: &Cli) -> Result<()> {
    let key_file = KeyFile::load(&cli.dest, &cli.label)?;
    let public_key = key_file.public_key()?;
    let params = &key_file.params;

    println!("Key Share Info:");
    println!("  Label: {}", key_file.label);
    println!(
        "  Parameters: N={} Q={} K={} L={} PARALLEL_SESSIONS={}",
        params.n, params.q, params.k, params.l, params.parallel_sessions
    );
    println!("  Matrix Seed: {}", hex::encode(public_key.seed));
    println!("  Public Key Size: {} bytes", public_key.to_bytes().len());
    Ok(())
}

async fn cmd_demo(cli: &Cli, message: Option<&str>) -> Result<()> {
    let params = load_params(cli)?;
    let message = match message {
        Some(hex_message) => hex::decode(hex_message)?,
        None => {
            let mut bytes = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            bytes
        }
    };

    let (alice, bob) = MemoryTransport::pair();
    let (a, b) = tokio::join!(
        run_keygen(&params, &alice, "alice"),
        run_keygen(&params, &bob, "bob")
    );
    let alice_keys = completed(a?, "alice keygen")?;
    let bob_keys = completed(b?, "bob keygen")?;
    println!("PK size: {}", alice_keys.public_key.to_bytes().len());

    let (a, b) = tokio::join!(
        run_sign(
            &params,
            &alice,
            &alice_keys.public_key,
            &alice_keys.share,
            &message,
            "alice"
        ),
        run_sign(
            &params,
            &bob,
            &bob_keys.public_key,
            &bob_keys.share,
            &message,
            "bob"
        )
    );
    let alice_sig: Signature = completed(a?, "alice signing")?;
    let bob_sig: Signature = completed(b?, "bob signing")?;
    println!("SIG size: {}", alice_sig.to_bytes().len());
    println!("Iterations: {}", alice_sig.iterations);

    let results = [
        verify(&params, &message, &alice_sig, &alice_keys.public_key),
        verify(&params, &message, &alice_sig, &bob_keys.public_key),
        verify(&params, &message, &bob_sig, &alice_keys.public_key),
        verify(&params, &message, &bob_sig, &bob_keys.public_key),
    ];
    println!("Signature results: {:?}", results);

    if results.contains(&false) {
        bail!("cross-verification failed");
    }
    Ok(())
}
