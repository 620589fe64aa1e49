//! BLS signatures over delivery digests.

use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use ff::Field;
use group::Curve;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use tender_types::{DeliveryProof, G1Point, G2Point, RequestId};

use crate::error::CryptoError;

const DIGEST_DOMAIN: &[u8] = b"TENDER_DELIVERY_V1:";

/// Generate an oracle signing key.
///
/// Returns the secret scalar and the compressed G2 public key that goes into
/// the genesis key set.
pub fn generate_signing_key<R: RngCore + CryptoRng>(rng: &mut R) -> (Scalar, G2Point) {
    let secret = Scalar::random(rng);
    let public = (G2Projective::generator() * secret).to_affine();
    (secret, compress_g2(&public))
}

/// Digest committing to a delivery's request id and plaintext batch.
///
/// The count prefix keeps `[1, 2]` and `[1]` followed by a different batch
/// from colliding.
pub fn delivery_digest(request_id: &RequestId, plaintexts: &[u64]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DIGEST_DOMAIN);
    hasher.update(request_id.0);
    hasher.update((plaintexts.len() as u64).to_le_bytes());
    for value in plaintexts {
        hasher.update(value.to_le_bytes());
    }
    hasher.finalize().into()
}

/// Sign a delivery: `sigma = sk * H1(digest)`.
pub fn sign_delivery(secret: &Scalar, request_id: &RequestId, plaintexts: &[u64]) -> G1Point {
    let digest = delivery_digest(request_id, plaintexts);
    let point = hash_to_g1(&digest);
    compress_g1(&(G1Projective::from(point) * secret).to_affine())
}

/// Verify a delivery proof against the configured oracle key set.
///
/// The proof names its signer by index; an out-of-range index is rejected
/// rather than falling back to trying every key.
pub fn verify_delivery(
    proof: &DeliveryProof,
    keys: &[G2Point],
    request_id: &RequestId,
    plaintexts: &[u64],
) -> Result<(), CryptoError> {
    let key = keys
        .get(proof.signer_index as usize)
        .ok_or(CryptoError::UnknownSigner(proof.signer_index))?;
    let pk = decompress_g2(&key.0)?;
    let sig = decompress_g1(&proof.signature.0)?;

    let digest = delivery_digest(request_id, plaintexts);
    let msg_point = hash_to_g1(&digest);

    // e(sigma, G2) == e(H1(digest), pk)
    let lhs = pairing(&sig, &G2Affine::generator());
    let rhs = pairing(&msg_point, &pk);

    if lhs == rhs {
        Ok(())
    } else {
        Err(CryptoError::SignatureVerificationFailed)
    }
}

/// Hash arbitrary data to a G1 point.
///
/// Simplified try-and-increment construction; a production deployment would
/// use the RFC 9380 hash-to-curve suite.
pub fn hash_to_g1(data: &[u8]) -> G1Affine {
    let mut counter = 0u64;
    loop {
        let mut hasher = Sha256::new();
        hasher.update(b"BLS12381G1_XMD:SHA-256_SSWU_RO_");
        hasher.update(data);
        hasher.update(counter.to_le_bytes());
        let hash = hasher.finalize();

        if let Some(point) = try_point_from_hash(&hash) {
            return point;
        }
        counter += 1;
    }
}

/// Attempt to construct a G1 point from a hash.
fn try_point_from_hash(hash: &[u8]) -> Option<G1Affine> {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash[..32]);

    // Interpret as scalar (mod order)
    let scalar = Scalar::from_bytes(&bytes);
    if scalar.is_some().into() {
        let scalar = scalar.unwrap();
        let point = G1Projective::generator() * scalar;
        Some(point.to_affine())
    } else {
        None
    }
}

/// Compress a G1 point to bytes.
pub fn compress_g1(point: &G1Affine) -> G1Point {
    G1Point(point.to_compressed())
}

/// Decompress a G1 point from bytes.
pub fn decompress_g1(bytes: &[u8; 48]) -> Result<G1Affine, CryptoError> {
    let point = G1Affine::from_compressed(bytes);
    if point.is_some().into() {
        Ok(point.unwrap())
    } else {
        Err(CryptoError::InvalidG1Point)
    }
}

/// Compress a G2 point to bytes.
pub fn compress_g2(point: &G2Affine) -> G2Point {
    G2Point(point.to_compressed())
}

/// Decompress a G2 point from bytes.
pub fn decompress_g2(bytes: &[u8; 96]) -> Result<G2Affine, CryptoError> {
    let point = G2Affine::from_compressed(bytes);
    if point.is_some().into() {
        Ok(point.unwrap())
    } else {
        Err(CryptoError::InvalidG2Point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn request_id(byte: u8) -> RequestId {
        RequestId([byte; 32])
    }

    #[test]
    fn test_sign_and_verify_delivery() {
        let mut rng = OsRng;
        let (secret, public) = generate_signing_key(&mut rng);

        let id = request_id(1);
        let plaintexts = vec![5u64, 2, 2];

        let signature = sign_delivery(&secret, &id, &plaintexts);
        let proof = DeliveryProof {
            signer_index: 0,
            signature,
        };

        assert!(verify_delivery(&proof, &[public], &id, &plaintexts).is_ok());
    }

    #[test]
    fn test_tampered_plaintexts_fail() {
        let mut rng = OsRng;
        let (secret, public) = generate_signing_key(&mut rng);

        let id = request_id(1);
        let signature = sign_delivery(&secret, &id, &[5, 2, 2]);
        let proof = DeliveryProof {
            signer_index: 0,
            signature,
        };

        // An attacker flipping one value to dictate the winner must fail.
        assert_eq!(
            verify_delivery(&proof, &[public], &id, &[5, 1, 2]),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_replay_against_other_request_fails() {
        let mut rng = OsRng;
        let (secret, public) = generate_signing_key(&mut rng);

        let plaintexts = vec![7u64];
        let signature = sign_delivery(&secret, &request_id(1), &plaintexts);
        let proof = DeliveryProof {
            signer_index: 0,
            signature,
        };

        assert_eq!(
            verify_delivery(&proof, &[public], &request_id(2), &plaintexts),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let mut rng = OsRng;
        let (secret, _) = generate_signing_key(&mut rng);
        let (_, other_public) = generate_signing_key(&mut rng);

        let id = request_id(3);
        let plaintexts = vec![1u64, 2];
        let signature = sign_delivery(&secret, &id, &plaintexts);
        let proof = DeliveryProof {
            signer_index: 0,
            signature,
        };

        assert_eq!(
            verify_delivery(&proof, &[other_public], &id, &plaintexts),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_unknown_signer_index_rejected() {
        let mut rng = OsRng;
        let (secret, public) = generate_signing_key(&mut rng);

        let id = request_id(4);
        let signature = sign_delivery(&secret, &id, &[9]);
        let proof = DeliveryProof {
            signer_index: 5,
            signature,
        };

        assert_eq!(
            verify_delivery(&proof, &[public], &id, &[9]),
            Err(CryptoError::UnknownSigner(5))
        );
    }

    #[test]
    fn test_digest_separates_batch_boundaries() {
        let id = request_id(1);
        let a = delivery_digest(&id, &[1, 2]);
        let b = delivery_digest(&id, &[1]);
        let c = delivery_digest(&request_id(2), &[1, 2]);

        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
