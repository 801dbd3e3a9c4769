//! Shared test harness: drive honest in-memory keygen/sign sessions to
//! completion across tokio tasks, the way `frost-party`'s demo binary does.

use frost_core::driver::{self, cancel_pair};
use frost_core::keygen::KeyGenRound1;
use frost_core::sign::SignRound1;
use frost_core::transport::MemoryHub;
use frost_core::{KeyGenOutput, PartySet, Result, SignOutput};

/// Run keygen across every member of `parties`, each on its own task over a
/// shared hub. Returns each party's output, in ascending id order.
pub async fn run_keygen(parties: &PartySet, threshold: usize) -> Result<Vec<KeyGenOutput>> {
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
        outputs.push(task.await.expect("keygen task panicked")?);
    }
    Ok(outputs)
}

/// Pick out, in `signers`' ascending order, the subset of `outputs` that
/// belongs to `signers` (a subset of the full party set `outputs` came
/// from).
pub fn select_outputs<'a>(
    full: &PartySet,
    outputs: &'a [KeyGenOutput],
    signers: &PartySet,
) -> Vec<&'a KeyGenOutput> {
    full.iter()
        .zip(outputs.iter())
        .filter(|(id, _)| signers.contains(*id))
        .map(|(_, output)| output)
        .collect()
}

/// Run a sign session across `signers`, each using the private share it was
/// handed in `outputs` (same order as `signers.iter()`).
pub async fn run_sign(
    signers: &PartySet,
    outputs: &[&KeyGenOutput],
    message: &[u8],
) -> Result<Vec<SignOutput>> {
    let (_hub, transports) = MemoryHub::new(signers);
    let mut tasks = Vec::with_capacity(signers.len());

    for ((id, transport), output) in signers
        .iter()
        .zip(transports.into_iter())
        .zip(outputs.iter().copied())
    {
        let signers = signers.clone();
        let secret_share = output.secret_share;
        let group_public_key = output.group_public_key;
        let public_shares = output.public_shares.clone();
        let message = message.to_vec();
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

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        results.push(task.await.expect("sign task panicked")?);
    }
    Ok(results)
}

pub fn verifies_under_ed25519(group_public_key: [u8; 32], message: &[u8], signature: [u8; 64]) -> bool {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    let Ok(verifying_key) = VerifyingKey::from_bytes(&group_public_key) else {
        return false;
    };
    let signature = Signature::from_bytes(&signature);
    verifying_key.verify_strict(message, &signature).is_ok()
}
