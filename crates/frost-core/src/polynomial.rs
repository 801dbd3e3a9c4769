//! Degree-`t` polynomials over the Ed25519 scalar field, their commitment
//! vectors, and Lagrange interpolation at zero.
//!
//! Grounded on the teacher's `keygen::dkg::generate_secret_polynomial` /
//! `evaluate_polynomial` shape and `sign::dsg::compute_lagrange_coefficient`,
//! generalized to full Pedersen-style degree-`t` commitments and
//! cross-checked against the Go original's
//! `pkg/helpers/polynomial/interpolate.go`.

use crate::error::{Error, Result};
use crate::party::PartyId;
use curve25519_dalek::{constants::ED25519_BASEPOINT_POINT, EdwardsPoint, Scalar};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A degree-`t` polynomial over the scalar field, stored as its `t+1`
/// coefficients with the constant term first. Zeroed on drop: the constant
/// term is a party's secret contribution to the joint key.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Polynomial {
    coefficients: Vec<Scalar>,
}

impl Polynomial {
    /// Sample a fresh degree-`t` polynomial with uniformly random
    /// coefficients. If `constant` is given, the constant term is fixed to
    /// it instead of being sampled (the caller-seeded-secret case of
    /// keygen round 1); otherwise the constant term is random too.
    pub fn sample<R: CryptoRngCore>(rng: &mut R, t: usize, constant: Option<Scalar>) -> Self {
        let mut coefficients: Vec<Scalar> = (0..=t).map(|_| Scalar::random(rng)).collect();
        if let Some(c) = constant {
            coefficients[0] = c;
        }
        Self { coefficients }
    }

    /// Degree of the polynomial (`t`, one less than the coefficient count).
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// The constant term `f(0)`, this party's secret contribution.
    pub fn constant_term(&self) -> Scalar {
        self.coefficients[0]
    }

    /// Evaluate `f(x)` via Horner's method.
    pub fn evaluate(&self, x: Scalar) -> Scalar {
        horner(&self.coefficients, x)
    }

    /// Evaluate `f(id)`, treating the party id as a nonzero scalar.
    pub fn evaluate_at_party(&self, id: PartyId) -> Scalar {
        self.evaluate(party_scalar(id))
    }

    /// The Feldman/Pedersen commitment vector `C_k = g^{a_k}`.
    pub fn commit(&self) -> Commitments {
        Commitments {
            points: self
                .coefficients
                .iter()
                .map(|a| ED25519_BASEPOINT_POINT * a)
                .collect(),
        }
    }
}

/// An ordered vector of `t+1` commitment points `C_k = g^{a_k}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Commitments {
    points: Vec<EdwardsPoint>,
}

impl Commitments {
    pub fn from_points(points: Vec<EdwardsPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[EdwardsPoint] {
        &self.points
    }

    /// Degree bound `t` implied by this vector's length.
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    /// The constant commitment `C_0 = g^{f(0)}`, this party's public
    /// contribution to the group key.
    pub fn constant(&self) -> EdwardsPoint {
        self.points[0]
    }

    /// Evaluate the commitment polynomial at `x`: `Σ_k C_k · x^k`, the
    /// group analogue of Horner's method (no early termination, since the
    /// terms don't nest the way scalar Horner's does).
    pub fn evaluate(&self, x: Scalar) -> EdwardsPoint {
        let mut power = Scalar::ONE;
        let mut acc = EdwardsPoint::default();
        for c in &self.points {
            acc += c * power;
            power *= x;
        }
        acc
    }

    /// Evaluate at a party id, treating it as a nonzero scalar.
    pub fn evaluate_at_party(&self, id: PartyId) -> EdwardsPoint {
        self.evaluate(party_scalar(id))
    }
}

/// Horner's method: `a_0 + x(a_1 + x(a_2 + ...))`.
fn horner(coefficients: &[Scalar], x: Scalar) -> Scalar {
    let mut acc = Scalar::ZERO;
    for a in coefficients.iter().rev() {
        acc = acc * x + a;
    }
    acc
}

/// Interpret a party id as a nonzero element of the scalar field.
pub fn party_scalar(id: PartyId) -> Scalar {
    Scalar::from(id.get() as u64)
}

/// `λ_j(0) = Π_{k∈S, k≠j} k · (k - j)^{-1}`, the Lagrange coefficient that
/// weights party `j`'s share when reconstructing the secret at `0` from the
/// set `signers`.
///
/// Returns [`Error::InvalidParty`] if `j` is not a member of `signers`; the
/// denominator cannot be zero otherwise since party ids are distinct
/// nonzero scalars.
pub fn lagrange_coefficient(j: PartyId, signers: &[PartyId]) -> Result<Scalar> {
    if !signers.contains(&j) {
        return Err(Error::InvalidParty(format!(
            "party {} is not a member of the signer set",
            j
        )));
    }

    let xj = party_scalar(j);
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;

    for &k in signers {
        if k == j {
            continue;
        }
        let xk = party_scalar(k);
        numerator *= xk;
        denominator *= xk - xj;
    }

    Ok(numerator * denominator.invert())
}
