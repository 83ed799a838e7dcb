use ahash::AHashMap;
use tracing::debug;
use vgroup_core::{Collection, PointId, Record};
use crate::assemble::assemble;
use crate::cancel::Cancellation;
use crate::config::GroupingConfig;
use crate::controller::{ExpansionController, GroupingSession};
use crate::request::GroupRequest;
use crate::source::{CandidateSource, CollectionSource};
use crate::types::GroupsResult;
use crate::Result;

/// Runs grouped requests against candidate sources
///
/// The engine holds only configuration; each request gets its own session,
/// so one engine can serve any number of concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupingEngine {
    config: GroupingConfig,
}

impl GroupingEngine {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Group the hits of `request` by its `group_by` field
    pub fn group_by<S>(&self, request: &GroupRequest, source: &S) -> Result<GroupsResult>
    where
        S: CandidateSource + ?Sized,
    {
        self.run(request, source, None)
    }

    /// Like [`GroupingEngine::group_by`], aborting with
    /// [`GroupingError::Cancelled`](crate::GroupingError::Cancelled) once
    /// `cancellation` fires
    pub fn group_by_with_cancel<S>(
        &self,
        request: &GroupRequest,
        source: &S,
        cancellation: &Cancellation,
    ) -> Result<GroupsResult>
    where
        S: CandidateSource + ?Sized,
    {
        self.run(request, source, Some(cancellation))
    }

    /// Grouped search or recommendation over a single collection
    pub fn search_groups(&self, collection: &Collection, request: &GroupRequest) -> Result<GroupsResult> {
        request.validate()?;
        let source = CollectionSource::for_request(collection, request)?;
        self.group_by(request, &source)
    }

    fn run<S>(&self, request: &GroupRequest, source: &S, cancellation: Option<&Cancellation>) -> Result<GroupsResult>
    where
        S: CandidateSource + ?Sized,
    {
        self.config.validate()?;
        request.validate()?;

        let mut controller = ExpansionController::new(&self.config);
        if let Some(cancellation) = cancellation {
            controller = controller.with_cancellation(cancellation);
        }
        let GroupingSession { aggregator, state, stats } = controller.run(request, source)?;

        let mut result = assemble(aggregator.into_groups(), &request.group_by, request.limit, request.per_group);
        hydrate(&mut result, request, source)?;

        debug!(
            ?state,
            rounds = stats.rounds,
            groups = result.groups.len(),
            hits = result.hit_count(),
            "grouped request served"
        );
        Ok(result)
    }
}

/// Replace the key-only payloads of the final hits with what the request
/// asked for
fn hydrate<S>(result: &mut GroupsResult, request: &GroupRequest, source: &S) -> Result<()>
where
    S: CandidateSource + ?Sized,
{
    let ids: Vec<PointId> = result
        .groups
        .iter()
        .flat_map(|g| g.hits.iter().map(|h| h.id.clone()))
        .collect();
    if ids.is_empty() {
        return Ok(());
    }

    let records: AHashMap<PointId, Record> = if request.with_payload.is_enabled() || request.with_vector {
        source
            .retrieve(&ids, &request.with_payload, request.with_vector)?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect()
    } else {
        AHashMap::new()
    };

    for hit in result.groups.iter_mut().flat_map(|g| g.hits.iter_mut()) {
        hit.hydrate(records.get(&hit.id));
    }
    Ok(())
}
