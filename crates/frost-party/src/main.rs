//! Demo CLI for `frost-core`.
//!
//! Spins up `n` parties wired together over an in-memory transport hub and
//! drives them through keygen and, optionally, signing, inside a single
//! process. There is nothing to persist between invocations: this exists
//! for manual/integration testing of the protocol end to end, not as a
//! production party node (no network transport, no on-disk share storage —
//! both are out of scope per the library's own non-goals).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use frost_core::driver::{self, cancel_pair};
use frost_core::keygen::KeyGenRound1;
use frost_core::sign::SignRound1;
use frost_core::transport::MemoryHub;
use frost_core::{KeyGenOutput, PartySet};
use tracing::{info, Level};

/// Demo driver for in-memory FROST keygen and signing.
#[derive(Parser)]
#[command(name = "frost-party")]
#[command(about = "Demo driver for in-memory FROST keygen and signing")]
#[command(version)]
struct Cli {
    /// Number of parties in the group.
    #[arg(short = 'n', long)]
    n: u16,

    /// Threshold: signing requires t+1 parties out of n.
    #[arg(short = 't', long)]
    t: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run distributed key generation across all `n` parties.
    Keygen,

    /// Run key generation, then sign `message` with the first `t+1`
    /// parties in ascending id order.
    Sign {
        /// Message to sign, hex-encoded.
        #[arg(short, long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let parties = PartySet::new(1..=cli.n).context("building the party set")?;

    info!(n = cli.n, t = cli.t, "starting keygen");
    let outputs = run_keygen(&parties, cli.t).await?;
    let group_key = outputs[0].to_verifying_key_bytes();
    info!(group_public_key = hex::encode(group_key), "keygen complete");
    println!("Group public key: {}", hex::encode(group_key));

    if let Commands::Sign { message } = cli.command {
        let message_bytes = hex::decode(&message).context("message must be hex-encoded")?;
        info!(message = %message, "starting signing session");
        let signature = run_sign(&parties, cli.t, &outputs, message_bytes).await?;
        info!(signature = hex::encode(signature), "signing complete");
        println!("Signature: {}", hex::encode(signature));
    }

    Ok(())
}

/// Run keygen across every member of `parties`, each in its own task over a
/// shared [`MemoryHub`]. Returns each party's output, in ascending id order.
async fn run_keygen(parties: &PartySet, threshold: usize) -> Result<Vec<KeyGenOutput>> {
    let (_hub, transports) = MemoryHub::new(parties);
    let mut tasks = Vec::with_capacity(parties.len());

    for (id, transport) in parties.iter().zip(transports.into_iter()) {
        let parties = parties.clone();
        tasks.push(tokio::spawn(async move {
            let (_cancel, token) = cancel_pair();
            let round = Box::new(KeyGenRound1::new(id, parties, threshold, None)?);
            driver::run(id, &transport, round, token).await
        }));
    }

    let mut outputs = Vec::with_capacity(tasks.len());
    for task in tasks {
        outputs.push(task.await.context("keygen task panicked")??);
    }
    Ok(outputs)
}

/// Sign `message` with the first `t+1` parties of `full_parties`, each
/// using the private share it was handed by [`run_keygen`]. Returns the
/// 64-byte `R ‖ S` signature every signer independently reached.
async fn run_sign(
    full_parties: &PartySet,
    threshold: usize,
    outputs: &[KeyGenOutput],
    message: Vec<u8>,
) -> Result<[u8; 64]> {
    let signer_count = threshold + 1;
    let signer_ids: Vec<u16> = full_parties.iter().take(signer_count).map(|id| id.get()).collect();
    let signers = PartySet::new(signer_ids).context("building the signer set")?;
    let (_hub, transports) = MemoryHub::new(&signers);

    let mut tasks = Vec::with_capacity(signers.len());
    for ((id, transport), output) in signers
        .iter()
        .zip(transports.into_iter())
        .zip(outputs.iter().take(signer_count))
    {
        let signers = signers.clone();
        let secret_share = output.secret_share;
        let group_public_key = output.group_public_key;
        let public_shares = output.public_shares.clone();
        let message = message.clone();
        tasks.push(tokio::spawn(async move {
            let (_cancel, token) = cancel_pair();
            let round = Box::new(SignRound1::new(
                id,
                signers,
                secret_share,
                group_public_key,
                public_shares,
                message,
            )?);
            driver::run(id, &transport, round, token).await
        }));
    }

    let mut signature = None;
    for task in tasks {
        let output = task.await.context("sign task panicked")??;
        signature.get_or_insert(output.to_signature_bytes());
    }
    signature.context("signer set was empty")
}
