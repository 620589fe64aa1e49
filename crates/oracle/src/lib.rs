//! Decryption oracle for the sealed-bid tender system.
//!
//! The oracle is the only party that ever sees plaintext bids. The core
//! talks to it through a narrow interface:
//!
//! 1. Outbound: [`DecryptionOracle::submit_decryption_request`] hands over a
//!    frozen ciphertext batch and receives an opaque request id.
//! 2. Inbound: the oracle later produces a [`Delivery`] carrying the
//!    plaintext batch in the same order plus a proof binding it to the
//!    request id. The core authenticates and consumes it asynchronously.
//!
//! [`MockOracle`] implements the interface against the mock homomorphic
//! backend's plaintext table and a real BLS signing key, so the full
//! request/deliver protocol (including proof verification) runs in tests.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use bls12_381::Scalar;
use tender_crypto::sign_delivery;
use tender_fhe::CipherStoreHandle;
use tender_types::{Ciphertext, DeliveryProof, RequestId};

/// Errors that can occur on the oracle side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("Empty ciphertext batch")]
    EmptyBatch,

    #[error("Unknown request: {0}")]
    UnknownRequest(RequestId),

    #[error("Ciphertext {0} cannot be decrypted")]
    UndecryptableCiphertext(Ciphertext),
}

/// Outbound interface from the tender core to the decryption service.
pub trait DecryptionOracle {
    /// Submit a batch of ciphertexts for decryption. Returns the opaque
    /// request id the eventual delivery will carry.
    fn submit_decryption_request(
        &mut self,
        project_id: u64,
        batch: &[Ciphertext],
    ) -> Result<RequestId, OracleError>;
}

/// A signed plaintext batch, delivered asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub request_id: RequestId,
    /// Plaintext bids in the exact order of the requested batch.
    pub plaintexts: Vec<u64>,
    pub proof: DeliveryProof,
}

/// Mock decryption oracle.
///
/// Records each submitted batch, decrypts it through the shared mock-FHE
/// table on demand, and signs deliveries with its BLS key. Splitting
/// submission from delivery keeps the asynchronous gap observable: tests can
/// interleave other operations, drop a delivery, or deliver twice.
pub struct MockOracle {
    store: CipherStoreHandle,
    signing_key: Scalar,
    signer_index: u32,
    pending: HashMap<RequestId, Vec<Ciphertext>>,
    counter: u64,
}

impl MockOracle {
    pub fn new(store: CipherStoreHandle, signing_key: Scalar, signer_index: u32) -> Self {
        Self {
            store,
            signing_key,
            signer_index,
            pending: HashMap::new(),
            counter: 0,
        }
    }

    /// Decrypt a pending batch and sign the result.
    ///
    /// Consumes the pending entry; delivering the same request twice requires
    /// cloning the first delivery, which the core must reject.
    pub fn produce_delivery(&mut self, request_id: &RequestId) -> Result<Delivery, OracleError> {
        let batch = self
            .pending
            .remove(request_id)
            .ok_or(OracleError::UnknownRequest(*request_id))?;

        let mut plaintexts = Vec::with_capacity(batch.len());
        for handle in &batch {
            let value = self
                .store
                .reveal(handle)
                .map_err(|_| OracleError::UndecryptableCiphertext(*handle))?;
            plaintexts.push(value);
        }

        let signature = sign_delivery(&self.signing_key, request_id, &plaintexts);

        info!(
            request_id = %request_id,
            batch_len = plaintexts.len(),
            "Produced signed decryption delivery"
        );

        Ok(Delivery {
            request_id: *request_id,
            plaintexts,
            proof: DeliveryProof {
                signer_index: self.signer_index,
                signature,
            },
        })
    }

    /// Request ids still awaiting delivery.
    pub fn pending_requests(&self) -> Vec<RequestId> {
        self.pending.keys().copied().collect()
    }
}

impl DecryptionOracle for MockOracle {
    fn submit_decryption_request(
        &mut self,
        project_id: u64,
        batch: &[Ciphertext],
    ) -> Result<RequestId, OracleError> {
        if batch.is_empty() {
            return Err(OracleError::EmptyBatch);
        }

        // Request id binds the project, a nonce, and the batch contents.
        let mut hasher = Sha256::new();
        hasher.update(b"TENDER_REQUEST_V1:");
        hasher.update(project_id.to_le_bytes());
        hasher.update(self.counter.to_le_bytes());
        for handle in batch {
            hasher.update(handle.0);
        }
        self.counter += 1;
        let request_id = RequestId(hasher.finalize().into());

        debug!(
            request_id = %request_id,
            project_id,
            batch_len = batch.len(),
            "Accepted decryption request"
        );

        self.pending.insert(request_id, batch.to_vec());
        Ok(request_id)
    }
}
