//! Encrypted running accumulators.
//!
//! Maintains `encrypted_sum`, `encrypted_min` and `encrypted_max` per
//! project as bids arrive. The comparison result of `lt`/`gt` is itself a
//! ciphertext, so the update is expressed as an oblivious `select` rather
//! than a branch: nothing here ever learns which operand won.

use tender_fhe::HomomorphicOps;
use tender_types::{Ciphertext, Project, MAX_BID_VALUE};

use crate::error::TenderError;

/// Initial accumulator handles for a new project:
/// `sum = 0`, `min = MAX_BID_VALUE`, `max = 0`.
pub fn init(
    fhe: &mut dyn HomomorphicOps,
    project_id: u64,
) -> Result<(Ciphertext, Ciphertext, Ciphertext), TenderError> {
    let sum = fhe.trivial_encrypt(0);
    let min = fhe.trivial_encrypt(MAX_BID_VALUE);
    let max = fhe.trivial_encrypt(0);
    for handle in [&sum, &min, &max] {
        fhe.allow(handle, project_id)?;
    }
    Ok((sum, min, max))
}

/// Fold one accepted bid into a project's accumulators.
///
/// Each homomorphic output is a fresh ciphertext, so the project's
/// permission to keep using the accumulators must be re-granted on every
/// update. Callers guard lifecycle state and deadline before invoking.
pub fn accumulate(
    fhe: &mut dyn HomomorphicOps,
    project: &mut Project,
    ciphertext: &Ciphertext,
) -> Result<(), TenderError> {
    let new_sum = fhe.add(&project.encrypted_sum, ciphertext)?;

    let is_lower = fhe.lt(ciphertext, &project.encrypted_min)?;
    let new_min = fhe.select(&is_lower, ciphertext, &project.encrypted_min)?;

    let is_higher = fhe.gt(ciphertext, &project.encrypted_max)?;
    let new_max = fhe.select(&is_higher, ciphertext, &project.encrypted_max)?;

    for handle in [&new_sum, &new_min, &new_max] {
        fhe.allow(handle, project.id)?;
    }

    project.encrypted_sum = new_sum;
    project.encrypted_min = new_min;
    project.encrypted_max = new_max;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tender_fhe::MockFhe;
    use tender_types::LifecycleState;

    fn project_with_accumulators(fhe: &mut MockFhe) -> Project {
        let (sum, min, max) = init(fhe, 1).unwrap();
        Project {
            id: 1,
            creator: [1u8; 32],
            title: "t".into(),
            description: String::new(),
            deadline: 1000,
            state: LifecycleState::Open,
            encrypted_sum: sum,
            encrypted_min: min,
            encrypted_max: max,
            num_bids: 0,
        }
    }

    #[test]
    fn test_initial_accumulator_values() {
        let mut fhe = MockFhe::new();
        let project = project_with_accumulators(&mut fhe);

        let store = fhe.store_handle();
        assert_eq!(store.reveal(&project.encrypted_sum).unwrap(), 0);
        assert_eq!(store.reveal(&project.encrypted_min).unwrap(), MAX_BID_VALUE);
        assert_eq!(store.reveal(&project.encrypted_max).unwrap(), 0);
    }

    #[test]
    fn test_accumulate_tracks_sum_min_max() {
        let mut fhe = MockFhe::new();
        let mut project = project_with_accumulators(&mut fhe);

        for value in [5u64, 2, 9, 2] {
            let ct = fhe.trivial_encrypt(value);
            accumulate(&mut fhe, &mut project, &ct).unwrap();
        }

        let store = fhe.store_handle();
        assert_eq!(store.reveal(&project.encrypted_sum).unwrap(), 18);
        assert_eq!(store.reveal(&project.encrypted_min).unwrap(), 2);
        assert_eq!(store.reveal(&project.encrypted_max).unwrap(), 9);
    }

    #[test]
    fn test_single_bid_is_both_min_and_max() {
        let mut fhe = MockFhe::new();
        let mut project = project_with_accumulators(&mut fhe);

        let ct = fhe.trivial_encrypt(7);
        accumulate(&mut fhe, &mut project, &ct).unwrap();

        let store = fhe.store_handle();
        assert_eq!(store.reveal(&project.encrypted_min).unwrap(), 7);
        assert_eq!(store.reveal(&project.encrypted_max).unwrap(), 7);
    }

    #[test]
    fn test_updated_handles_are_fresh_and_regranted() {
        let mut fhe = MockFhe::new();
        let mut project = project_with_accumulators(&mut fhe);
        let old_sum = project.encrypted_sum;

        let ct = fhe.trivial_encrypt(3);
        accumulate(&mut fhe, &mut project, &ct).unwrap();

        assert_ne!(project.encrypted_sum, old_sum);
        assert!(fhe.is_allowed(&project.encrypted_sum, project.id));
        assert!(fhe.is_allowed(&project.encrypted_min, project.id));
        assert!(fhe.is_allowed(&project.encrypted_max, project.id));
    }
}
