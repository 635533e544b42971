//! # JobGraph
//!
//! The compiled, scheduler-facing form of a stream DAG: one vertex per
//! logical stream node and one edge per (upstream, node) pair.
//!
//! A JobGraph is immutable once [`JobGraphBuilder::build`](crate::graph::JobGraphBuilder::build)
//! returns it and is `Send + Sync`, so a scheduler and a visualizer can read it
//! side by side.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::JobConfig;
use crate::graph::Partition;
use crate::operator::{Operator, OperatorKind};
use crate::types::{Language, NodeId};

/// A job vertex id; equal to the id of the stream node it was compiled from.
pub type VertexId = NodeId;

/// The role of a vertex in the job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VertexType {
    Source,
    Transformation,
    Sink,
}

impl std::fmt::Display for VertexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VertexType::Source => "SOURCE",
            VertexType::Transformation => "TRANSFORMATION",
            VertexType::Sink => "SINK",
        };
        f.write_str(name)
    }
}

/// A vertex in the JobGraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobVertex {
    pub vertex_id: VertexId,
    pub parallelism: u32,
    pub vertex_type: VertexType,
    pub operator: Operator,
}

/// An edge in the JobGraph. `partition` is the upstream vertex's strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEdge {
    pub src_vertex_id: VertexId,
    pub target_vertex_id: VertexId,
    pub partition: Partition,
}

/// The compiled job: vertices keyed by id and edges in discovery order.
#[derive(Debug, Clone, Default)]
pub struct JobGraph {
    job_name: String,
    job_config: JobConfig,
    vertices: HashMap<VertexId, JobVertex>,
    edges: Vec<JobEdge>,
}

impl JobGraph {
    pub(crate) fn new(job_name: String, job_config: JobConfig) -> Self {
        Self {
            job_name,
            job_config,
            vertices: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Insert a vertex unless one with the same id exists. Returns whether it was inserted.
    pub(crate) fn add_vertex(&mut self, vertex: JobVertex) -> bool {
        if self.vertices.contains_key(&vertex.vertex_id) {
            return false;
        }
        self.vertices.insert(vertex.vertex_id, vertex);
        true
    }

    pub(crate) fn add_edge(&mut self, edge: JobEdge) {
        self.edges.push(edge);
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn job_config(&self) -> &JobConfig {
        &self.job_config
    }

    /// Vertices in no particular order.
    pub fn vertices(&self) -> impl Iterator<Item = &JobVertex> {
        self.vertices.values()
    }

    /// Vertices sorted by id.
    pub fn sorted_vertices(&self) -> Vec<&JobVertex> {
        let mut vertices: Vec<_> = self.vertices.values().collect();
        vertices.sort_by_key(|v| v.vertex_id);
        vertices
    }

    pub fn vertex(&self, id: VertexId) -> Option<&JobVertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edges(&self) -> &[JobEdge] {
        &self.edges
    }

    /// Ids of source vertices, sorted.
    pub fn sources(&self) -> Vec<VertexId> {
        self.ids_of(VertexType::Source)
    }

    /// Ids of sink vertices, sorted.
    pub fn sinks(&self) -> Vec<VertexId> {
        self.ids_of(VertexType::Sink)
    }

    fn ids_of(&self, vertex_type: VertexType) -> Vec<VertexId> {
        let mut ids: Vec<_> = self
            .vertices
            .values()
            .filter(|v| v.vertex_type == vertex_type)
            .map(|v| v.vertex_id)
            .collect();
        ids.sort();
        ids
    }

    /// Get downstream vertex ids for a given vertex.
    pub fn downstream(&self, id: VertexId) -> Vec<VertexId> {
        self.edges
            .iter()
            .filter(|e| e.src_vertex_id == id)
            .map(|e| e.target_vertex_id)
            .collect()
    }

    /// Get upstream vertex ids for a given vertex.
    pub fn upstream(&self, id: VertexId) -> Vec<VertexId> {
        self.edges
            .iter()
            .filter(|e| e.target_vertex_id == id)
            .map(|e| e.src_vertex_id)
            .collect()
    }

    /// Topological order of the vertices (Kahn's algorithm). Among ready
    /// vertices the smallest id goes first.
    pub fn topological_order(&self) -> Vec<VertexId> {
        let mut in_degree: BTreeMap<VertexId, usize> =
            self.vertices.keys().map(|&id| (id, 0)).collect();
        let mut adj: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
        for edge in &self.edges {
            *in_degree.entry(edge.target_vertex_id).or_insert(0) += 1;
            adj.entry(edge.src_vertex_id)
                .or_default()
                .push(edge.target_vertex_id);
        }

        let mut ready: Vec<VertexId> = in_degree
            .iter()
            .filter(|entry| *entry.1 == 0)
            .map(|entry| *entry.0)
            .collect();

        let mut result = Vec::with_capacity(in_degree.len());
        loop {
            // Keep `ready` sorted descending so `pop` yields the smallest id.
            ready.sort_by(|a, b| b.cmp(a));
            let Some(id) = ready.pop() else { break };
            result.push(id);
            for next in adj.get(&id).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(*next);
                    }
                }
            }
        }
        result
    }

    /// Render the graph in Graphviz DOT format.
    pub fn digraph(&self) -> String {
        let label = |id: VertexId| -> String {
            match self.vertices.get(&id) {
                Some(v) => format!("{}-{}", id, v.operator.name()),
                None => id.to_string(),
            }
        };

        let mut dot = String::new();
        let _ = writeln!(dot, "digraph \"{}\" {{", escape(&self.job_name));
        for vertex in self.sorted_vertices() {
            let _ = writeln!(dot, "  \"{}\";", escape(&label(vertex.vertex_id)));
        }
        for edge in &self.edges {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                escape(&label(edge.src_vertex_id)),
                escape(&label(edge.target_vertex_id)),
                escape(&edge.partition.to_string()),
            );
        }
        dot.push('}');
        dot.push('\n');
        dot
    }

    /// A serializable summary of the graph. Operator bodies are not included.
    pub fn plan(&self) -> JobPlan {
        JobPlan {
            job_name: self.job_name.clone(),
            job_config: self.job_config.clone(),
            vertices: self
                .sorted_vertices()
                .into_iter()
                .map(|v| VertexPlan {
                    vertex_id: v.vertex_id,
                    parallelism: v.parallelism,
                    vertex_type: v.vertex_type,
                    operator_kind: v.operator.kind(),
                    language: v.operator.language(),
                    operator: v.operator.name(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgePlan {
                    src_vertex_id: e.src_vertex_id,
                    target_vertex_id: e.target_vertex_id,
                    partition: e.partition.to_string(),
                })
                .collect(),
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Serializable vertex summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VertexPlan {
    pub vertex_id: VertexId,
    pub parallelism: u32,
    pub vertex_type: VertexType,
    pub operator_kind: OperatorKind,
    pub language: Language,
    pub operator: String,
}

/// Serializable edge summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgePlan {
    pub src_vertex_id: VertexId,
    pub target_vertex_id: VertexId,
    pub partition: String,
}

/// Serializable summary of a [`JobGraph`], for display and hand-off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobPlan {
    pub job_name: String,
    pub job_config: JobConfig,
    pub vertices: Vec<VertexPlan>,
    pub edges: Vec<EdgePlan>,
}

#[cfg(test)]
#[path = "tests/job_graph_tests.rs"]
mod tests;
