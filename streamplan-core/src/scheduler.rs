//! The seam between job graph compilation and execution.

use crate::graph::JobGraph;

/// Places and runs a compiled job. Implemented outside this crate.
pub trait JobScheduler {
    /// Take over `job_graph`. The job config travels inside the graph.
    fn schedule(&mut self, job_graph: &JobGraph) -> anyhow::Result<()>;
}
