use crate::core::element::loci::{Boundary, Loci};
use crate::core::element::query::Query;
use crate::core::structure::Structure;
use crate::engine::error::EngineError;
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub loci: Loci,
    pub boundary: Boundary,
}

/// Applies a persisted query to `structure`.
#[instrument(skip_all, name = "replay_workflow")]
pub fn run(structure: &Arc<Structure>, query: &Query) -> Result<ReplayResult, EngineError> {
    let loci = query.to_loci(structure).map_err(|e| {
        error!(error = %e, "Query does not belong to this structure");
        e
    })?;
    let boundary = loci.get_boundary();
    info!(elements = loci.size(), "Replay complete.");
    Ok(ReplayResult { loci, boundary })
}
