//! Winner resolution over a decrypted bid batch.
//!
//! Pure single-scan computation; the tie-break is first-bidder-wins, which
//! is deterministic and stable with respect to the ledger's submission
//! order.

use tender_types::Address;

/// Outcome of scanning a decrypted bid batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutcome {
    /// First bidder (by submission order) at the minimum.
    pub winner: Address,
    pub winner_index: usize,
    pub min: u64,
    pub max: u64,
    /// Integer-truncated `sum / count`.
    pub average: u64,
}

/// Resolve a tender from bidders and their decrypted bids, both in ledger
/// order.
///
/// Returns `None` on an empty or length-mismatched input; the coordinator
/// short-circuits zero-bid tenders upstream and validates batch length
/// against the snapshot, so `None` here indicates a protocol violation.
///
/// The sum is widened to `u128` so large bidder counts cannot wrap the
/// fixed-width bid domain.
pub fn resolve_outcome(bidders: &[Address], values: &[u64]) -> Option<ResolvedOutcome> {
    if values.is_empty() || bidders.len() != values.len() {
        return None;
    }

    let mut winner_index = 0usize;
    let mut min = values[0];
    let mut max = values[0];
    let mut sum: u128 = 0;

    for (index, &value) in values.iter().enumerate() {
        // Strict comparison keeps the earliest index on ties.
        if value < min {
            min = value;
            winner_index = index;
        }
        if value > max {
            max = value;
        }
        sum += value as u128;
    }

    let average = (sum / values.len() as u128) as u64;

    Some(ResolvedOutcome {
        winner: bidders[winner_index],
        winner_index,
        min,
        max,
        average,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        [byte; 32]
    }

    #[test]
    fn test_lowest_bid_wins() {
        let bidders = [addr(1), addr(2), addr(3)];
        let outcome = resolve_outcome(&bidders, &[5, 2, 2]).unwrap();

        assert_eq!(outcome.winner, addr(2));
        assert_eq!(outcome.winner_index, 1);
        assert_eq!(outcome.min, 2);
        assert_eq!(outcome.max, 5);
        assert_eq!(outcome.average, 3);
    }

    #[test]
    fn test_tie_break_first_bidder_wins() {
        // Explicit fixture pinning the tie-break: the first bidder to reach
        // the minimum wins, not the last.
        let bidders = [addr(1), addr(2), addr(3)];
        let outcome = resolve_outcome(&bidders, &[2, 5, 2]).unwrap();
        assert_eq!(outcome.winner_index, 0);
        assert_eq!(outcome.winner, addr(1));
    }

    #[test]
    fn test_average_truncates_toward_zero() {
        let bidders = [addr(1), addr(2), addr(3)];
        // sum=11, count=3 -> 3, not 3.67 and not 4
        let outcome = resolve_outcome(&bidders, &[3, 4, 4]).unwrap();
        assert_eq!(outcome.average, 3);
    }

    #[test]
    fn test_single_bid() {
        let outcome = resolve_outcome(&[addr(9)], &[42]).unwrap();
        assert_eq!(outcome.winner, addr(9));
        assert_eq!(outcome.min, 42);
        assert_eq!(outcome.max, 42);
        assert_eq!(outcome.average, 42);
    }

    #[test]
    fn test_sum_widens_beyond_bid_domain() {
        // Two maximal bids would wrap a u64 sum; the widened intermediate
        // must not.
        let bidders = [addr(1), addr(2)];
        let outcome = resolve_outcome(&bidders, &[u64::MAX, u64::MAX]).unwrap();
        assert_eq!(outcome.average, u64::MAX);
    }

    #[test]
    fn test_empty_and_mismatched_inputs_rejected() {
        assert!(resolve_outcome(&[], &[]).is_none());
        assert!(resolve_outcome(&[addr(1)], &[1, 2]).is_none());
    }
}
