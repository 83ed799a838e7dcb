//! Expansion controller
//!
//! Drives rounds of retrieval against a [`CandidateSource`] until the best
//! `limit` groups are complete, the source runs dry, or the pool-size cap is
//! reached. The pool starts at `limit * per_group` and doubles each round.
//!
//! While groups are still being discovered, fetches skip groups that are
//! already full. Once `limit` groups exist but some of the best ones lack
//! hits, fetches are narrowed to exactly those groups.

use tracing::{debug, warn};
use crate::aggregator::GroupsAggregator;
use crate::cancel::Cancellation;
use crate::config::GroupingConfig;
use crate::request::GroupRequest;
use crate::source::{CandidateSource, FetchRequest, KeyScope};
use crate::{GroupingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    Expanding,
    /// The best `limit` groups are full and stayed so for the confirming
    /// rounds, or until the source or the pool cap ended the session
    Satisfied,
    /// The source ran dry or the pool cap was hit before groups were complete
    Exhausted,
}

/// Bookkeeping of one grouping session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Rounds attempted
    pub rounds: usize,
    /// Candidates returned by the source across all rounds
    pub consumed: usize,
    /// Candidates that entered a group
    pub inserted: usize,
    /// Pool size of the last round
    pub pool_size: usize,
}

/// State of one grouped request, discarded once the response is assembled
#[derive(Debug)]
pub struct GroupingSession {
    pub aggregator: GroupsAggregator,
    pub state: ExpansionState,
    pub stats: SessionStats,
}

impl GroupingSession {
    pub fn new(request: &GroupRequest) -> Self {
        Self {
            aggregator: GroupsAggregator::new(request.limit, request.per_group, request.group_by.clone()),
            state: ExpansionState::Expanding,
            stats: SessionStats::default(),
        }
    }

    fn next_scope(&self, limit: usize) -> KeyScope {
        if self.aggregator.len() >= limit {
            let unfilled = self.aggregator.unfilled_best_keys();
            if !unfilled.is_empty() {
                return KeyScope::Only(unfilled);
            }
        }

        let full = self.aggregator.full_keys();
        if full.is_empty() {
            KeyScope::Any
        } else {
            KeyScope::Exclude(full)
        }
    }
}

pub struct ExpansionController<'a> {
    config: &'a GroupingConfig,
    cancellation: Option<&'a Cancellation>,
}

impl<'a> ExpansionController<'a> {
    pub fn new(config: &'a GroupingConfig) -> Self {
        Self {
            config,
            cancellation: None,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: &'a Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancellation {
            Some(c) if c.is_cancelled() => Err(GroupingError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Run rounds until the session is `Satisfied` or `Exhausted`
    pub fn run<S>(&self, request: &GroupRequest, source: &S) -> Result<GroupingSession>
    where
        S: CandidateSource + ?Sized,
    {
        let initial = request.limit.saturating_mul(request.per_group).max(1);
        let cap = initial.saturating_mul(self.config.max_pool_multiplier.max(1));

        let mut session = GroupingSession::new(request);
        let mut pool_size = initial;
        let mut was_complete = false;
        let mut confirmations = 0usize;

        while session.state == ExpansionState::Expanding {
            self.check_cancelled()?;

            let scope = session.next_scope(request.limit);
            let batch = source.fetch(&FetchRequest {
                pool_size,
                exclude_ids: session.aggregator.ids(),
                key_path: &request.group_by,
                key_scope: &scope,
            })?;

            let returned = batch.len();
            let inserted = session.aggregator.add_points(batch);
            session.stats.rounds += 1;
            session.stats.consumed += returned;
            session.stats.inserted += inserted;
            session.stats.pool_size = pool_size;

            let complete = session.aggregator.is_complete();
            confirmations = if complete && was_complete { confirmations + 1 } else { 0 };
            was_complete = complete;

            debug!(
                round = session.stats.rounds,
                pool_size,
                returned,
                inserted,
                groups = session.aggregator.len(),
                complete,
                "grouping round finished"
            );

            if complete && confirmations >= self.config.confirm_rounds {
                session.state = ExpansionState::Satisfied;
            } else if returned < pool_size {
                session.state = if complete {
                    ExpansionState::Satisfied
                } else {
                    ExpansionState::Exhausted
                };
            } else if pool_size >= cap {
                if complete {
                    session.state = ExpansionState::Satisfied;
                } else {
                    warn!(
                        pool_size,
                        groups = session.aggregator.len(),
                        "grouping pool cap reached before groups were complete"
                    );
                    session.state = ExpansionState::Exhausted;
                }
            } else {
                pool_size = pool_size.saturating_mul(2).min(cap);
            }
        }

        debug!(
            state = ?session.state,
            rounds = session.stats.rounds,
            consumed = session.stats.consumed,
            groups = session.aggregator.len(),
            "grouping session finished"
        );
        Ok(session)
    }
}
