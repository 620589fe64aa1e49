//! Call message types for the tender module.

use borsh::{BorshDeserialize, BorshSerialize};

use tender_types::{Ciphertext, DeliveryProof, InputProof, RequestId};

/// Call messages for the tender module.
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize)]
pub enum TenderCall {
    // === Tender Lifecycle ===
    /// Create a new tender project.
    CreateProject {
        title: String,
        description: String,
        deadline: u64,
    },

    /// Submit an encrypted bid with its input proof.
    PlaceBid {
        project_id: u64,
        ciphertext: Ciphertext,
        proof: InputProof,
    },

    /// Close the bidding window early (creator only).
    Terminate { project_id: u64 },

    /// Start the decryption round for a closed tender (permissionless).
    RequestDecryption { project_id: u64 },

    // === Oracle Protocol ===
    /// Deliver decrypted plaintexts for an outstanding request.
    DeliverDecryption {
        request_id: RequestId,
        plaintexts: Vec<u64>,
        proof: DeliveryProof,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tender_types::G1Point;

    #[test]
    fn test_call_borsh_roundtrip() {
        let call = TenderCall::DeliverDecryption {
            request_id: RequestId([7u8; 32]),
            plaintexts: vec![5, 2, 2],
            proof: DeliveryProof {
                signer_index: 0,
                signature: G1Point([3u8; 48]),
            },
        };

        let bytes = borsh::to_vec(&call).unwrap();
        let decoded = TenderCall::try_from_slice(&bytes).unwrap();
        match decoded {
            TenderCall::DeliverDecryption {
                request_id,
                plaintexts,
                proof,
            } => {
                assert_eq!(request_id, RequestId([7u8; 32]));
                assert_eq!(plaintexts, vec![5, 2, 2]);
                assert_eq!(proof.signer_index, 0);
                assert_eq!(proof.signature, G1Point([3u8; 48]));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }
}
