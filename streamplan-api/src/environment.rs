use anyhow::Context;
use streamplan_core::config::JobConfig;
use streamplan_core::context::StreamingContext;
use streamplan_core::error::GraphError;
use streamplan_core::graph::{JobGraph, StreamNode};
use streamplan_core::operator::{FunctionDescriptor, FunctionRef, Operator, OperatorKind};
use streamplan_core::scheduler::JobScheduler;
use streamplan_core::types::StreamData;

use crate::datastream::DataStream;
use crate::foreign::ForeignStream;
use crate::function::SourceFunction;

/// The entry point for building a stream processing job.
///
/// Create an environment, add sources via [`from_iter`](Self::from_iter) or
/// [`foreign_source`](Self::foreign_source), chain transformations on the
/// returned streams, and call [`execute`](Self::execute) to hand the compiled
/// job graph to a scheduler.
#[derive(Debug)]
pub struct StreamExecutionEnvironment {
    context: StreamingContext,
    job_name: String,
    job_config: JobConfig,
}

impl StreamExecutionEnvironment {
    /// Create a new execution environment for a job with the given name.
    pub fn new(job_name: &str) -> Self {
        Self {
            context: StreamingContext::new(),
            job_name: job_name.to_string(),
            job_config: JobConfig::new(),
        }
    }

    pub fn with_config(mut self, job_config: JobConfig) -> Self {
        self.job_config.merge(job_config);
        self
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.job_config.insert(key, value);
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn job_config(&self) -> &JobConfig {
        &self.job_config
    }

    pub fn context(&self) -> &StreamingContext {
        &self.context
    }

    /// Add a source that produces the elements of `iter`.
    pub fn from_iter<T, I>(&self, iter: I) -> DataStream<T>
    where
        T: StreamData + Clone + Sync,
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = iter.into_iter().collect();
        self.from_source(move || items.clone())
    }

    /// Add a source whose elements are produced by `produce`.
    pub fn from_source<T, F>(&self, produce: F) -> DataStream<T>
    where
        T: StreamData,
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        let function = FunctionRef::native("source", SourceFunction::new(produce));
        let op = Operator::new(OperatorKind::Source, function);
        DataStream::from_node(StreamNode::source(&self.context, op))
    }

    /// Add a source implemented by the foreign `function`.
    pub fn foreign_source(&self, function: FunctionDescriptor) -> ForeignStream {
        let op = Operator::new(OperatorKind::Source, FunctionRef::Foreign(function));
        ForeignStream::from_node(StreamNode::source(&self.context, op))
    }

    /// Compile every sink added so far into a job graph.
    pub fn build_job_graph(&self) -> Result<JobGraph, GraphError> {
        self.context
            .build_job_graph(self.job_name.clone(), self.job_config.clone())
    }

    /// Compile the job and hand it to `scheduler`.
    pub fn execute(&self, scheduler: &mut dyn JobScheduler) -> anyhow::Result<()> {
        let job_graph = self
            .build_job_graph()
            .with_context(|| format!("failed to build job graph for `{}`", self.job_name))?;
        tracing::info!(
            job = %self.job_name,
            vertices = job_graph.vertex_count(),
            "submitting job graph"
        );
        scheduler
            .schedule(&job_graph)
            .with_context(|| format!("failed to schedule job `{}`", self.job_name))
    }
}
