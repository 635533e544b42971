//! # JobGraphBuilder
//!
//! Compiles the logical stream DAG reachable from a set of sinks into a [`JobGraph`].
//!
//! The walk runs backward from each sink over an explicit worklist. Reference
//! streams are skipped (they are the same logical stream as their target), each
//! node is emitted once no matter how many paths reach it, and every
//! (upstream, node) pair becomes one edge carrying the upstream's partition.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::JobConfig;
use crate::error::GraphError;
use crate::graph::{JobEdge, JobGraph, JobVertex, StreamKind, StreamNode, VertexType};
use crate::types::NodeId;

/// Builds a [`JobGraph`] from sink streams.
#[derive(Debug)]
pub struct JobGraphBuilder {
    sinks: Vec<StreamNode>,
    job_name: String,
    job_config: JobConfig,
}

impl JobGraphBuilder {
    /// A builder over `sinks` with a generated job name and empty config.
    pub fn new(sinks: Vec<StreamNode>) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            sinks,
            job_name: format!("job-{millis}"),
            job_config: JobConfig::new(),
        }
    }

    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = job_name.into();
        self
    }

    pub fn with_config(mut self, job_config: JobConfig) -> Self {
        self.job_config = job_config;
        self
    }

    /// Compile the DAG. Either the whole graph is returned or nothing is.
    pub fn build(self) -> Result<JobGraph, GraphError> {
        let mut job_graph = JobGraph::new(self.job_name, self.job_config);
        let mut processed: HashSet<NodeId> = HashSet::new();

        for sink in &self.sinks {
            let root = sink.resolve()?;
            if root.kind() != StreamKind::Sink {
                return Err(GraphError::NotASink { node: root.id() });
            }
            process_stream(root, &mut job_graph, &mut processed)?;
        }

        tracing::info!(
            job = job_graph.job_name(),
            vertices = job_graph.vertex_count(),
            edges = job_graph.edges().len(),
            "built job graph"
        );
        Ok(job_graph)
    }
}

fn process_stream(
    root: StreamNode,
    job_graph: &mut JobGraph,
    processed: &mut HashSet<NodeId>,
) -> Result<(), GraphError> {
    let mut pending = vec![root];

    while let Some(stream) = pending.pop() {
        let stream = stream.resolve()?;
        let id = stream.id();
        if !processed.insert(id) {
            continue;
        }

        let operator = stream.operator();
        // Defensive: a direct node's language is its operator's.
        if stream.language() != operator.language() {
            return Err(GraphError::LanguageMismatch {
                node: id,
                language: stream.language(),
                operator_language: operator.language(),
            });
        }

        let vertex_type = classify(&stream)?;
        tracing::debug!(id, %vertex_type, operator = %operator.name(), "emit job vertex");
        job_graph.add_vertex(JobVertex {
            vertex_id: id,
            parallelism: stream.parallelism(),
            vertex_type,
            operator,
        });

        for input in stream.inputs() {
            let parent = input.resolve()?;
            job_graph.add_edge(JobEdge {
                src_vertex_id: parent.id(),
                target_vertex_id: id,
                partition: parent.partition(),
            });
            if !processed.contains(&parent.id()) {
                pending.push(parent);
            }
        }
    }

    Ok(())
}

fn classify(stream: &StreamNode) -> Result<VertexType, GraphError> {
    if stream.is_reference() {
        return Err(GraphError::UnsupportedStream { node: stream.id() });
    }
    Ok(match stream.kind() {
        StreamKind::Source => VertexType::Source,
        StreamKind::Transform | StreamKind::MultiInput => VertexType::Transformation,
        StreamKind::Sink => VertexType::Sink,
    })
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod tests;
