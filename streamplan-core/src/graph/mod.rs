//! Graph-domain modules: the logical stream DAG and the compiled JobGraph.

pub mod builder;
pub mod job_graph;
pub mod partition;
pub mod stream_node;

pub use builder::*;
pub use job_graph::*;
pub use partition::*;
pub use stream_node::*;
