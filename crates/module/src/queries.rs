//! Query handlers for the tender module.
//!
//! These functions provide read-only access to tender state. Data queries
//! are infallible (absence is `None`); the typed winner accessor is the one
//! place a query can fail, because "not resolved yet" must be
//! distinguishable from "resolved with no bids".

use serde::{Deserialize, Serialize};

use tender_types::{Address, Bid, LifecycleState, Project, TenderResult, TenderStats};

use crate::error::TenderError;
use crate::state::TenderState;

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TenderQuery {
    /// Get project details by ID.
    GetProject { project_id: u64 },

    /// Get all projects (paginated).
    ListProjects { offset: u64, limit: u64 },

    /// Get the bid ledger of a project, in submission order.
    GetBids { project_id: u64 },

    /// Get a project's published result.
    GetResult { project_id: u64 },

    /// Get a project's revealed statistics.
    GetStats { project_id: u64 },
}

/// Query response types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TenderQueryResponse {
    /// Project details.
    Project(Option<Project>),

    /// List of project summaries.
    ProjectList(Vec<ProjectSummary>),

    /// Bids for a project.
    Bids(Vec<Bid>),

    /// Published result.
    Result(Option<TenderResult>),

    /// Revealed statistics (zeroed until resolution).
    Stats(TenderStats),
}

/// Handle a query.
pub fn handle_query(state: &TenderState, query: TenderQuery) -> TenderQueryResponse {
    match query {
        TenderQuery::GetProject { project_id } => {
            TenderQueryResponse::Project(state.get_project(project_id).cloned())
        }

        TenderQuery::ListProjects { offset, limit } => TenderQueryResponse::ProjectList(
            get_project_summaries(state, offset as usize, limit as usize),
        ),

        TenderQuery::GetBids { project_id } => {
            let bids = state
                .get_ledger(project_id)
                .map(|ledger| ledger.bids().to_vec())
                .unwrap_or_default();
            TenderQueryResponse::Bids(bids)
        }

        TenderQuery::GetResult { project_id } => {
            TenderQueryResponse::Result(state.get_result(project_id).cloned())
        }

        TenderQuery::GetStats { project_id } => {
            TenderQueryResponse::Stats(get_stats(state, project_id))
        }
    }
}

/// Revealed statistics for a project.
///
/// Before resolution nothing has been decrypted, so every field reads zero;
/// the single atomic reveal happens when the delivery handler publishes the
/// result. Missing projects also read zero.
pub fn get_stats(state: &TenderState, project_id: u64) -> TenderStats {
    match state.get_result(project_id) {
        Some(result) => TenderStats {
            count: result.num_bids,
            average: result.average,
            max: result.max,
            min: result.min,
        },
        None => TenderStats::zero(),
    }
}

/// Winner of a resolved tender, with the winning (minimum) bid.
///
/// `Ok(None, min)` means the tender resolved without bids. An unresolved
/// project is an error rather than an empty answer, so callers cannot
/// mistake "still sealed" for "nobody won".
pub fn get_winner(
    state: &TenderState,
    project_id: u64,
) -> Result<(Option<Address>, u64), TenderError> {
    let project = state
        .get_project(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    if project.state != LifecycleState::Resolved {
        return Err(TenderError::NotReady);
    }
    let result = state
        .get_result(project_id)
        .ok_or(TenderError::NotReady)?;
    Ok((result.winner, result.min))
}

/// Summary of a project for listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: u64,
    pub creator: Address,
    pub title: String,
    pub state: LifecycleState,
    pub deadline: u64,
    pub num_bids: u64,
}

impl ProjectSummary {
    pub fn from_project(project: &Project) -> Self {
        Self {
            project_id: project.id,
            creator: project.creator,
            title: project.title.clone(),
            state: project.state.clone(),
            deadline: project.deadline,
            num_bids: project.num_bids,
        }
    }
}

/// Get project summaries for listing, in project-id order.
pub fn get_project_summaries(
    state: &TenderState,
    offset: usize,
    limit: usize,
) -> Vec<ProjectSummary> {
    let mut projects: Vec<&Project> = state.projects.values().collect();
    projects.sort_by_key(|project| project.id);
    projects
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(ProjectSummary::from_project)
        .collect()
}

/// Get projects currently accepting bids.
pub fn get_open_projects(state: &TenderState, current_time: u64) -> Vec<ProjectSummary> {
    let mut open: Vec<ProjectSummary> = state
        .projects
        .values()
        .filter(|project| {
            project.state == LifecycleState::Open && current_time < project.deadline
        })
        .map(ProjectSummary::from_project)
        .collect();
    open.sort_by_key(|summary| summary.project_id);
    open
}

/// Get projects whose decryption round may be started.
pub fn get_decryptable_projects(state: &TenderState, current_time: u64) -> Vec<u64> {
    let mut ready: Vec<u64> = state
        .projects
        .values()
        .filter(|project| match project.state {
            LifecycleState::Terminated => true,
            LifecycleState::Open => current_time >= project.deadline,
            _ => false,
        })
        .map(|project| project.id)
        .collect();
    ready.sort_unstable();
    ready
}

#[cfg(test)]
mod tests {
    use super::*;
    use tender_types::Ciphertext;

    fn project(id: u64, state: LifecycleState, deadline: u64) -> Project {
        Project {
            id,
            creator: [1u8; 32],
            title: format!("project {id}"),
            description: String::new(),
            deadline,
            state,
            encrypted_sum: Ciphertext::default(),
            encrypted_min: Ciphertext::default(),
            encrypted_max: Ciphertext::default(),
            num_bids: 0,
        }
    }

    #[test]
    fn test_stats_are_zero_until_resolved() {
        let mut state = TenderState::new(Vec::new());
        state
            .projects
            .insert(1, project(1, LifecycleState::DecryptionPending, 100));

        assert_eq!(get_stats(&state, 1), TenderStats::zero());
        assert_eq!(get_stats(&state, 99), TenderStats::zero());
    }

    #[test]
    fn test_stats_reflect_published_result() {
        let mut state = TenderState::new(Vec::new());
        state
            .projects
            .insert(1, project(1, LifecycleState::Resolved, 100));
        state.results.insert(
            1,
            TenderResult {
                project_id: 1,
                min: 2,
                max: 5,
                average: 3,
                winner: Some([3u8; 32]),
                num_bids: 3,
                resolved_at: 120,
            },
        );

        let stats = get_stats(&state, 1);
        assert_eq!(stats.count, 3);
        assert_eq!((stats.min, stats.max, stats.average), (2, 5, 3));
    }

    #[test]
    fn test_winner_unavailable_before_resolution() {
        let mut state = TenderState::new(Vec::new());
        state.projects.insert(1, project(1, LifecycleState::Open, 100));

        assert_eq!(get_winner(&state, 1), Err(TenderError::NotReady));
        assert_eq!(
            get_winner(&state, 99),
            Err(TenderError::ProjectNotFound(99))
        );
    }

    #[test]
    fn test_winner_none_for_zero_bid_resolution() {
        let mut state = TenderState::new(Vec::new());
        state
            .projects
            .insert(1, project(1, LifecycleState::Resolved, 100));
        state.results.insert(
            1,
            TenderResult {
                project_id: 1,
                min: 0,
                max: 0,
                average: 0,
                winner: None,
                num_bids: 0,
                resolved_at: 120,
            },
        );

        assert_eq!(get_winner(&state, 1), Ok((None, 0)));
    }

    #[test]
    fn test_list_projects_is_ordered_and_paginated() {
        let mut state = TenderState::new(Vec::new());
        for id in [3u64, 1, 2] {
            state
                .projects
                .insert(id, project(id, LifecycleState::Open, 100));
        }

        let summaries = get_project_summaries(&state, 0, 10);
        let ids: Vec<u64> = summaries.iter().map(|s| s.project_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let page = get_project_summaries(&state, 1, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].project_id, 2);
    }

    #[test]
    fn test_decryptable_projects() {
        let mut state = TenderState::new(Vec::new());
        state.projects.insert(1, project(1, LifecycleState::Open, 100));
        state
            .projects
            .insert(2, project(2, LifecycleState::Terminated, 100));
        state
            .projects
            .insert(3, project(3, LifecycleState::Resolved, 100));

        // Before the deadline only the terminated project is ready.
        assert_eq!(get_decryptable_projects(&state, 50), vec![2]);
        // Past the deadline the open one joins it.
        assert_eq!(get_decryptable_projects(&state, 100), vec![1, 2]);
    }
}
