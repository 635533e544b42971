//! # StreamingContext
//!
//! Hands out node ids and collects the sinks of the job being assembled.
//! A context lives on one thread: it is shared through `Rc` and is `!Send`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::JobConfig;
use crate::error::GraphError;
use crate::graph::{JobGraph, JobGraphBuilder, StreamNode};
use crate::types::NodeId;

type SinkRegistry = RefCell<Vec<StreamNode>>;

/// Id generator and sink registry for one logical job.
///
/// Cloning returns another handle to the same context.
#[derive(Clone, Default)]
pub struct StreamingContext {
    next_id: Rc<Cell<NodeId>>,
    sinks: Rc<SinkRegistry>,
}

impl StreamingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next id. The first id is 1; ids strictly increase.
    pub fn generate_id(&self) -> NodeId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Record a sink of this job. Sink construction calls this itself.
    pub fn add_sink(&self, sink: StreamNode) {
        self.sinks.borrow_mut().push(sink);
    }

    /// Registered sinks in registration order.
    pub fn sinks(&self) -> Vec<StreamNode> {
        self.sinks.borrow().clone()
    }

    /// Compile the registered sinks into a job graph.
    pub fn build_job_graph(
        &self,
        job_name: impl Into<String>,
        job_config: JobConfig,
    ) -> Result<JobGraph, GraphError> {
        JobGraphBuilder::new(self.sinks())
            .with_job_name(job_name)
            .with_config(job_config)
            .build()
    }

    pub(crate) fn link(&self) -> ContextLink {
        ContextLink {
            next_id: Rc::clone(&self.next_id),
            sinks: Rc::downgrade(&self.sinks),
        }
    }
}

impl std::fmt::Debug for StreamingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingContext")
            .field("last_id", &self.next_id.get())
            .field("sinks", &self.sinks.borrow().len())
            .finish()
    }
}

/// The part of a context a stream node keeps.
///
/// The registry is held weakly: it owns the sinks, and sinks own their inputs.
#[derive(Clone)]
pub(crate) struct ContextLink {
    next_id: Rc<Cell<NodeId>>,
    sinks: Weak<SinkRegistry>,
}

impl ContextLink {
    pub(crate) fn upgrade(&self) -> Option<StreamingContext> {
        self.sinks.upgrade().map(|sinks| StreamingContext {
            next_id: Rc::clone(&self.next_id),
            sinks,
        })
    }

    pub(crate) fn generate_id(&self) -> NodeId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Register a sink; a dropped context has nobody left to build it.
    pub(crate) fn add_sink(&self, sink: StreamNode) {
        if let Some(sinks) = self.sinks.upgrade() {
            sinks.borrow_mut().push(sink);
        }
    }
}
