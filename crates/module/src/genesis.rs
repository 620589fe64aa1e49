//! Genesis configuration for the tender module.
//!
//! Defines the oracle key set deliveries are authenticated against. The key
//! set is fixed at genesis; rotating it mid-flight would invalidate
//! outstanding requests.

use serde::{Deserialize, Serialize};

use tender_types::G2Point;

use crate::state::TenderState;

/// Genesis configuration for the tender module.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TenderGenesisConfig {
    /// Oracle public keys trusted to sign decryption deliveries
    pub oracle_keys: Vec<OracleKeyConfig>,
}

/// Configuration for a single oracle signer's key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleKeyConfig {
    /// Signer index, 0-based; deliveries name their signer by this index
    pub index: u32,
    /// Public key for verifying delivery signatures
    pub public_key: G2Point,
}

impl TenderGenesisConfig {
    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        if self.oracle_keys.is_empty() {
            return Err(GenesisValidationError::NoOracleKeys);
        }

        // Indices must be exactly 0..n, so the key vector can be indexed by
        // signer index with nothing missing or ambiguous.
        let mut indices: Vec<u32> = self.oracle_keys.iter().map(|key| key.index).collect();
        indices.sort_unstable();
        for (position, index) in indices.iter().enumerate() {
            if *index != position as u32 {
                return Err(GenesisValidationError::NonContiguousIndices {
                    expected: position as u32,
                    got: *index,
                });
            }
        }

        Ok(())
    }

    /// Build the initial module state from this configuration.
    pub fn init_state(&self) -> Result<TenderState, GenesisValidationError> {
        self.validate()?;

        let mut keys = self.oracle_keys.clone();
        keys.sort_by_key(|key| key.index);
        Ok(TenderState::new(
            keys.into_iter().map(|key| key.public_key).collect(),
        ))
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("At least one oracle key is required")]
    NoOracleKeys,

    #[error("Oracle key indices must be contiguous from zero: expected {expected}, got {got}")]
    NonContiguousIndices { expected: u32, got: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(index: u32, byte: u8) -> OracleKeyConfig {
        OracleKeyConfig {
            index,
            public_key: G2Point([byte; 96]),
        }
    }

    #[test]
    fn test_empty_key_set_rejected() {
        let config = TenderGenesisConfig::default();
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::NoOracleKeys)
        ));
    }

    #[test]
    fn test_contiguous_indices_accepted() {
        let config = TenderGenesisConfig {
            oracle_keys: vec![key(1, 2), key(0, 1), key(2, 3)],
        };
        assert!(config.validate().is_ok());

        let state = config.init_state().unwrap();
        assert_eq!(state.oracle_keys.len(), 3);
        // Keys land in index order regardless of config order.
        assert_eq!(state.oracle_keys[0], G2Point([1u8; 96]));
        assert_eq!(state.oracle_keys[2], G2Point([3u8; 96]));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let config = TenderGenesisConfig {
            oracle_keys: vec![key(0, 1), key(0, 2)],
        };
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::NonContiguousIndices { .. })
        ));
    }

    #[test]
    fn test_gap_in_indices_rejected() {
        let config = TenderGenesisConfig {
            oracle_keys: vec![key(0, 1), key(2, 2)],
        };
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::NonContiguousIndices { expected: 1, got: 2 })
        ));
    }
}
