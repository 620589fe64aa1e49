//! Guarded lifecycle transitions.
//!
//! All race-sensitive guard logic lives here, in one place. Every function
//! takes the project record by `&mut` (or checks by `&`) inside the caller's
//! critical section, so a guard and its transition are a single atomic step:
//! two concurrent decryption requests cannot both pass `ensure_decryptable`
//! and both flip the state.
//!
//! Legal transitions:
//!
//! ```text
//! Open ──terminate──> Terminated ──┐
//!  │                               ├──> DecryptionPending ──> Resolved
//!  └────(deadline passed)──────────┘
//! ```

use tender_types::{Address, LifecycleState, Project};

use crate::error::TenderError;

/// Bids are accepted only while Open and strictly before the deadline.
pub fn ensure_open_for_bidding(project: &Project, now: u64) -> Result<(), TenderError> {
    if project.state != LifecycleState::Open {
        return Err(TenderError::InvalidState {
            expected: LifecycleState::Open,
            got: project.state.clone(),
        });
    }
    if now >= project.deadline {
        return Err(TenderError::DeadlinePassed);
    }
    Ok(())
}

/// Manual termination: creator-only, requires Open. Allowed after the
/// deadline has passed, but never once decryption has begun.
pub fn terminate(project: &mut Project, caller: &Address) -> Result<(), TenderError> {
    if *caller != project.creator {
        return Err(TenderError::NotCreator);
    }
    match project.state {
        LifecycleState::Open => {
            project.state = LifecycleState::Terminated;
            Ok(())
        }
        LifecycleState::Resolved => Err(TenderError::AlreadyResolved),
        _ => Err(TenderError::InvalidState {
            expected: LifecycleState::Open,
            got: project.state.clone(),
        }),
    }
}

/// Whether a decryption round may begin: terminated, or past the deadline;
/// not already pending; not resolved.
pub fn ensure_decryptable(project: &Project, now: u64) -> Result<(), TenderError> {
    match project.state {
        LifecycleState::Terminated => Ok(()),
        LifecycleState::Open if now >= project.deadline => Ok(()),
        LifecycleState::Open => Err(TenderError::StillOpen),
        LifecycleState::DecryptionPending => Err(TenderError::DecryptionAlreadyRequested),
        LifecycleState::Resolved => Err(TenderError::AlreadyResolved),
    }
}

/// Check-and-flip into DecryptionPending.
pub fn begin_decryption(project: &mut Project, now: u64) -> Result<(), TenderError> {
    ensure_decryptable(project, now)?;
    project.state = LifecycleState::DecryptionPending;
    Ok(())
}

/// Terminal transition. Only a consumed decryption round (or the zero-bid
/// short-circuit, which passes through DecryptionPending within one atomic
/// step) may resolve a project.
pub fn finish_resolution(project: &mut Project) -> Result<(), TenderError> {
    match project.state {
        LifecycleState::DecryptionPending => {
            project.state = LifecycleState::Resolved;
            Ok(())
        }
        LifecycleState::Resolved => Err(TenderError::AlreadyResolved),
        _ => Err(TenderError::InvalidState {
            expected: LifecycleState::DecryptionPending,
            got: project.state.clone(),
        }),
    }
}
