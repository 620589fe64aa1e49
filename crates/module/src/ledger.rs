//! Append-only bid ledger.
//!
//! One ledger per project, holding `(bidder, ciphertext)` pairs in strict
//! submission order. That order is the only handle available to map a
//! decrypted value back to its bidder, since ciphertexts carry no plaintext
//! index. Once the decryption round begins the ledger is frozen for good.

use tender_types::{Address, Bid, Ciphertext};

use crate::error::TenderError;

/// Ordered, freezable sequence of bids for one project.
#[derive(Debug, Default, Clone)]
pub struct BidLedger {
    bids: Vec<Bid>,
    frozen: bool,
}

impl BidLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bid; returns its zero-based position.
    pub fn append(
        &mut self,
        bidder: Address,
        ciphertext: Ciphertext,
        timestamp: u64,
    ) -> Result<u64, TenderError> {
        if self.frozen {
            return Err(TenderError::LedgerFrozen);
        }
        let position = self.bids.len() as u64;
        self.bids.push(Bid {
            bidder,
            ciphertext,
            timestamp,
        });
        Ok(position)
    }

    /// Mark the ledger read-only. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> u64 {
        self.bids.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Ordered ciphertext sequence for handoff to the decryption oracle.
    pub fn snapshot(&self) -> Vec<Ciphertext> {
        self.bids.iter().map(|bid| bid.ciphertext).collect()
    }

    /// Bidders in submission order, aligned with `snapshot()`.
    pub fn bidders(&self) -> Vec<Address> {
        self.bids.iter().map(|bid| bid.bidder).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct(byte: u8) -> Ciphertext {
        Ciphertext([byte; 32])
    }

    #[test]
    fn test_append_returns_positions_in_order() {
        let mut ledger = BidLedger::new();
        assert_eq!(ledger.append([1u8; 32], ct(1), 10).unwrap(), 0);
        assert_eq!(ledger.append([2u8; 32], ct(2), 11).unwrap(), 1);
        assert_eq!(ledger.append([3u8; 32], ct(3), 12).unwrap(), 2);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_snapshot_preserves_submission_order() {
        let mut ledger = BidLedger::new();
        ledger.append([1u8; 32], ct(9), 10).unwrap();
        ledger.append([2u8; 32], ct(4), 11).unwrap();

        assert_eq!(ledger.snapshot(), vec![ct(9), ct(4)]);
        assert_eq!(ledger.bidders(), vec![[1u8; 32], [2u8; 32]]);
    }

    #[test]
    fn test_append_after_freeze_fails() {
        let mut ledger = BidLedger::new();
        ledger.append([1u8; 32], ct(1), 10).unwrap();
        ledger.freeze();

        let result = ledger.append([2u8; 32], ct(2), 11);
        assert_eq!(result, Err(TenderError::LedgerFrozen));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let mut ledger = BidLedger::new();
        ledger.freeze();
        ledger.freeze();
        assert!(ledger.is_frozen());
        assert!(ledger.is_empty());
    }
}
