//! # StreamPlan Core
//!
//! Logical stream DAG model and the compiler that lowers it into a job graph.
//!
//! - [`graph`]: [`StreamNode`](graph::StreamNode) (direct and reference nodes),
//!   [`Partition`](graph::Partition), [`JobGraph`](graph::JobGraph) and
//!   [`JobGraphBuilder`](graph::JobGraphBuilder).
//! - [`context`]: [`StreamingContext`](context::StreamingContext), the id
//!   generator and sink registry.
//! - [`operator`]: opaque handles to user functions in either language.
//! - [`partitioner`]: routing rules behind native partitions.
//! - [`scheduler`]: the [`JobScheduler`](scheduler::JobScheduler) seam.
//! - [`config`], [`error`], [`types`]: ambient types.

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod operator;
pub mod partitioner;
pub mod scheduler;
pub mod types;
