//! End-to-end scenarios over the in-memory transport: honest runs that must
//! verify, and adversarial ones that must fail with the right attribution.

mod common;

use common::{run_keygen, run_sign, select_outputs, verifies_under_ed25519};
use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::Scalar;
use frost_core::codec::Frame;
use frost_core::driver::{self, cancel_pair, NextRound, Round};
use frost_core::keygen::KeyGenRound1;
use frost_core::sign::SignRound1;
use frost_core::transport::{MemoryHub, Transport};
use frost_core::{Error, PartyId, PartySet};
use futures_util::StreamExt;

fn pid(v: u16) -> PartyId {
    PartyId::try_from(v).unwrap()
}

/// S1: `(t, N) = (1, 3)`, sign with `{1, 2}`.
#[tokio::test]
async fn s1_threshold_1_of_3_signer_subset_one_two() {
    let parties = PartySet::new([1, 2, 3]).unwrap();
    let outputs = run_keygen(&parties, 1).await.unwrap();
    let group_key = outputs[0].to_verifying_key_bytes();

    let signers = PartySet::new([1, 2]).unwrap();
    let signer_outputs = select_outputs(&parties, &outputs, &signers);
    let results = run_sign(&signers, &signer_outputs, b"hello").await.unwrap();

    for result in &results {
        assert!(verifies_under_ed25519(group_key, b"hello", result.to_signature_bytes()));
    }
}

/// S2: same group, sign with `{2, 3}` instead.
#[tokio::test]
async fn s2_threshold_1_of_3_signer_subset_two_three() {
    let parties = PartySet::new([1, 2, 3]).unwrap();
    let outputs = run_keygen(&parties, 1).await.unwrap();
    let group_key = outputs[0].to_verifying_key_bytes();

    let signers = PartySet::new([2, 3]).unwrap();
    let signer_outputs = select_outputs(&parties, &outputs, &signers);
    let results = run_sign(&signers, &signer_outputs, b"hello").await.unwrap();

    for result in &results {
        assert!(verifies_under_ed25519(group_key, b"hello", result.to_signature_bytes()));
    }
}

/// S3: `(t, N) = (2, 3)`, every party must sign.
#[tokio::test]
async fn s3_threshold_2_of_3_every_party_signs() {
    let parties = PartySet::new([1, 2, 3]).unwrap();
    let outputs = run_keygen(&parties, 2).await.unwrap();
    let group_key = outputs[0].to_verifying_key_bytes();

    let signer_outputs: Vec<_> = outputs.iter().collect();
    let results = run_sign(&parties, &signer_outputs, b"hello").await.unwrap();

    for result in &results {
        assert!(verifies_under_ed25519(group_key, b"hello", result.to_signature_bytes()));
    }
}

/// S5: two independent sign sessions over disjoint signer sets produce
/// distinct, independently verifying signatures (fresh nonces each time).
#[tokio::test]
async fn s5_disjoint_signer_sets_produce_distinct_signatures() {
    let parties = PartySet::new([1, 2, 3, 4, 5]).unwrap();
    let outputs = run_keygen(&parties, 2).await.unwrap();
    let group_key = outputs[0].to_verifying_key_bytes();

    let signers_a = PartySet::new([1, 2, 3]).unwrap();
    let outputs_a = select_outputs(&parties, &outputs, &signers_a);
    let results_a = run_sign(&signers_a, &outputs_a, b"hello").await.unwrap();

    let signers_b = PartySet::new([3, 4, 5]).unwrap();
    let outputs_b = select_outputs(&parties, &outputs, &signers_b);
    let results_b = run_sign(&signers_b, &outputs_b, b"hello").await.unwrap();

    for result in results_a.iter().chain(results_b.iter()) {
        assert!(verifies_under_ed25519(group_key, b"hello", result.to_signature_bytes()));
    }
    assert_ne!(results_a[0].s, results_b[0].s);
}

/// Boundary: `t = 1, N = 2`, the smallest meaningful threshold.
#[tokio::test]
async fn boundary_smallest_threshold_succeeds() {
    let parties = PartySet::new([1, 2]).unwrap();
    let outputs = run_keygen(&parties, 1).await.unwrap();
    let group_key = outputs[0].to_verifying_key_bytes();
    let signer_outputs: Vec<_> = outputs.iter().collect();
    let results = run_sign(&parties, &signer_outputs, b"hi").await.unwrap();
    for result in &results {
        assert!(verifies_under_ed25519(group_key, b"hi", result.to_signature_bytes()));
    }
}

/// Boundary: `t = 0` or `t >= N` is rejected at session creation.
#[tokio::test]
async fn boundary_invalid_threshold_is_rejected_at_creation() {
    let parties = PartySet::new([1, 2, 3]).unwrap();
    assert!(matches!(
        KeyGenRound1::new(pid(1), parties.clone(), 0, None),
        Err(Error::InvalidParty(_))
    ));
    assert!(matches!(
        KeyGenRound1::new(pid(1), parties.clone(), 3, None),
        Err(Error::InvalidParty(_))
    ));
}

/// S4: party 2 tampers with its own `D` before broadcasting. Party 1's
/// session must reject the resulting signature share, attributed to party 2.
#[tokio::test]
async fn s4_tampered_nonce_commitment_is_rejected() {
    let parties = PartySet::new([1, 2, 3]).unwrap();
    let outputs = run_keygen(&parties, 1).await.unwrap();

    let signers = PartySet::new([1, 2]).unwrap();
    let signer_outputs = select_outputs(&parties, &outputs, &signers);
    let out1 = signer_outputs[0];
    let out2 = signer_outputs[1];

    let (_hub, mut transports) = MemoryHub::new(&signers);
    let t2 = transports.remove(1);
    let t1 = transports.remove(0);

    let honest = tokio::spawn({
        let signers = signers.clone();
        let secret_share = out1.secret_share;
        let group_public_key = out1.group_public_key;
        let public_shares = out1.public_shares.clone();
        async move {
            let (_cancel, token) = cancel_pair();
            let round = Box::new(
                SignRound1::new(pid(1), signers, secret_share, group_public_key, public_shares, b"hello".to_vec())
                    .unwrap(),
            );
            driver::run(pid(1), &t1, round, token).await
        }
    });

    // Party 2 drives its own round by hand, tampering with the `D` it puts
    // on the wire (its local view, and therefore its later signature
    // share, stays honest).
    let mut round: Box<SignRound1> = Box::new(
        SignRound1::new(
            pid(2),
            signers,
            out2.secret_share,
            out2.group_public_key,
            out2.public_shares.clone(),
            b"hello".to_vec(),
        )
        .unwrap(),
    );

    for frame in round.on_enter().unwrap() {
        let tampered = match frame {
            Frame::Sign1 { from, d, e } => Frame::Sign1 {
                from,
                d: d + ED25519_BASEPOINT_POINT,
                e,
            },
            other => other,
        };
        t2.send(tampered).await.unwrap();
    }

    let mut incoming = t2.incoming();
    while !round.is_ready() {
        let frame = incoming.next().await.unwrap();
        if frame.from() == pid(2) {
            continue;
        }
        round.store_message(frame).unwrap();
    }
    round.process_messages().await.unwrap();
    let _ = round.generate_messages().unwrap();
    match round.next_round().unwrap() {
        NextRound::Round(mut next) => {
            for frame in next.on_enter().unwrap() {
                t2.send(frame).await.unwrap();
            }
        }
        NextRound::Terminal(_) => unreachable!("sign round 1 never terminates directly"),
    }

    let result = honest.await.unwrap();
    assert!(matches!(result, Err(Error::InvalidSigShare { party_id: 2 })));
}

/// S6: party 3's `KeyGen2` share to party 1 is zeroed. Party 1 must report
/// `InvalidShare` attributed to party 3; party 2, who got an honest share,
/// must complete normally.
#[tokio::test]
async fn s6_zeroed_share_is_rejected() {
    let parties = PartySet::new([1, 2, 3]).unwrap();
    let threshold = 1;
    let (_hub, mut transports) = MemoryHub::new(&parties);
    let t3 = transports.remove(2);
    let t2 = transports.remove(1);
    let t1 = transports.remove(0);

    let h1 = tokio::spawn({
        let parties = parties.clone();
        async move {
            let (_cancel, token) = cancel_pair();
            let round = Box::new(KeyGenRound1::new(pid(1), parties, threshold, None).unwrap());
            driver::run(pid(1), &t1, round, token).await
        }
    });
    let h2 = tokio::spawn({
        let parties = parties.clone();
        async move {
            let (_cancel, token) = cancel_pair();
            let round = Box::new(KeyGenRound1::new(pid(2), parties, threshold, None).unwrap());
            driver::run(pid(2), &t2, round, token).await
        }
    });

    // Party 3 drives its own round by hand so it can zero the share it
    // sends to party 1 while keeping party 2's honest.
    let mut round: Box<KeyGenRound1> =
        Box::new(KeyGenRound1::new(pid(3), parties.clone(), threshold, None).unwrap());
    for frame in round.on_enter().unwrap() {
        t3.send(frame).await.unwrap();
    }
    let mut incoming = t3.incoming();
    while !round.is_ready() {
        let frame = incoming.next().await.unwrap();
        if frame.from() == pid(3) {
            continue;
        }
        round.store_message(frame).unwrap();
    }
    round.process_messages().await.unwrap();
    for frame in round.generate_messages().unwrap() {
        let tampered = match frame {
            Frame::KeyGen2 { from, to, share } if to == pid(1) => Frame::KeyGen2 {
                from,
                to,
                share: Scalar::ZERO,
            },
            other => other,
        };
        t3.send(tampered).await.unwrap();
    }

    let result1 = h1.await.unwrap();
    assert!(matches!(result1, Err(Error::InvalidShare { party_id: 3 })));

    let result2 = h2.await.unwrap();
    assert!(result2.is_ok());
}
