use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{ContextLink, StreamingContext};
use crate::error::GraphError;
use crate::graph::Partition;
use crate::operator::{FunctionRef, Operator, OperatorKind};
use crate::types::{Language, NodeId};

/// Longest reference chain the builder follows before giving up.
pub const MAX_REFERENCE_DEPTH: usize = 64;

/// The shape of a stream node in the logical DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// No upstream.
    Source,
    /// Exactly one upstream (map, filter, key-by, reduce, ...).
    Transform,
    /// An ordered list of upstreams (union, join).
    MultiInput,
    /// Exactly one upstream and no downstream.
    Sink,
}

/// A handle to a node of the logical stream DAG.
///
/// Handles are cheap to clone and share one node. A handle is either the node
/// itself or a reference that views another node through the other
/// language's API surface; a reference forwards every query and mutation to
/// the node it points at.
#[derive(Clone)]
pub struct StreamNode(Rc<NodeCell>);

enum NodeCell {
    Direct(RefCell<NodeState>),
    Reference { target: StreamNode, language: Language },
}

struct NodeState {
    id: NodeId,
    kind: StreamKind,
    operator: Operator,
    inputs: Vec<StreamNode>,
    parallelism: u32,
    partition: Partition,
    context: ContextLink,
}

impl StreamNode {
    /// Create a source node with parallelism 1.
    pub fn source(context: &StreamingContext, operator: Operator) -> Self {
        let link = context.link();
        let id = link.generate_id();
        Self::direct_node(NodeState {
            id,
            kind: StreamKind::Source,
            partition: Partition::default_for(operator.language()),
            operator,
            inputs: Vec::new(),
            parallelism: 1,
            context: link,
        })
    }

    /// Create a single-input transform consuming `input`.
    pub fn transform(input: &StreamNode, operator: Operator) -> Self {
        Self::derived(StreamKind::Transform, vec![input.clone()], operator)
    }

    /// Create a node consuming `first` followed by `rest`, in order.
    /// Parallelism is inherited from `first`.
    pub fn multi_input(first: &StreamNode, rest: &[StreamNode], operator: Operator) -> Self {
        let mut inputs = Vec::with_capacity(rest.len() + 1);
        inputs.push(first.clone());
        inputs.extend(rest.iter().cloned());
        Self::derived(StreamKind::MultiInput, inputs, operator)
    }

    /// Create a sink consuming `input` and register it with the context.
    pub fn sink(input: &StreamNode, operator: Operator) -> Self {
        let sink = Self::derived(StreamKind::Sink, vec![input.clone()], operator);
        sink.direct().borrow().context.add_sink(sink.clone());
        sink
    }

    /// Create a reference that views `target` as a `language` stream.
    /// No id is allocated; the reference shares all state with `target`.
    ///
    /// A reference always points at a direct node, so bridging an existing
    /// reference replaces its view instead of growing a chain.
    pub fn reference(target: &StreamNode, language: Language) -> Self {
        Self::reference_to(target.direct_handle().clone(), language)
    }

    fn reference_to(target: StreamNode, language: Language) -> Self {
        StreamNode(Rc::new(NodeCell::Reference { target, language }))
    }

    /// A reference pointing at `target` as given, without collapsing chains.
    #[cfg(test)]
    fn chained_reference(target: &StreamNode, language: Language) -> Self {
        Self::reference_to(target.clone(), language)
    }

    /// View this node through the other language's API surface.
    pub fn bridge(&self) -> Self {
        Self::reference(self, self.language().other())
    }

    /// Create the key-by transform over this node. Its output is partitioned
    /// by `key_function`.
    pub fn key_by(&self, key_function: FunctionRef) -> Result<Self, GraphError> {
        self.check_partition_call()?;
        let partition = Partition::key_based_for(&key_function);
        let keyed = Self::transform(self, Operator::new(OperatorKind::KeyBy, key_function));
        keyed.set_partition(partition);
        Ok(keyed)
    }

    /// Send this node's output to every downstream instance. Idempotent.
    pub fn broadcast(&self) -> Result<(), GraphError> {
        self.check_partition_call()?;
        self.set_partition(Partition::broadcast_for(self.language()));
        Ok(())
    }

    /// Route this node's output with `partition`.
    pub fn partition_by(&self, partition: Partition) -> Result<(), GraphError> {
        self.check_partition_call()?;
        self.set_partition(partition);
        Ok(())
    }

    /// Reject partition changes when an input is implemented in another language:
    /// the producer routes with its own language's rules.
    pub fn check_partition_call(&self) -> Result<(), GraphError> {
        let language = self.language();
        for input in self.inputs() {
            let input_language = input.resolve()?.language();
            if input_language != language {
                return Err(GraphError::CrossLanguagePartition {
                    node: self.id(),
                    language,
                    input: input.id(),
                    input_language,
                });
            }
        }
        Ok(())
    }

    fn direct_node(state: NodeState) -> Self {
        StreamNode(Rc::new(NodeCell::Direct(RefCell::new(state))))
    }

    fn derived(kind: StreamKind, inputs: Vec<StreamNode>, operator: Operator) -> Self {
        let (parallelism, link) = {
            let upstream = inputs[0].direct().borrow();
            (upstream.parallelism, upstream.context.clone())
        };
        let id = link.generate_id();
        Self::direct_node(NodeState {
            id,
            kind,
            partition: Partition::default_for(operator.language()),
            operator,
            inputs,
            parallelism,
            context: link,
        })
    }

    /// The handle of the node at the end of the reference chain.
    fn direct_handle(&self) -> &StreamNode {
        let mut node = self;
        while let NodeCell::Reference { target, .. } = &*node.0 {
            node = target;
        }
        node
    }

    /// The state of the node at the end of the reference chain.
    fn direct(&self) -> &RefCell<NodeState> {
        let mut node = self;
        loop {
            match &*node.0 {
                NodeCell::Direct(state) => return state,
                NodeCell::Reference { target, .. } => node = target,
            }
        }
    }

    pub fn id(&self) -> NodeId {
        self.direct().borrow().id
    }

    /// Language of the API surface this handle belongs to.
    pub fn language(&self) -> Language {
        match &*self.0 {
            NodeCell::Direct(state) => state.borrow().operator.language(),
            NodeCell::Reference { language, .. } => *language,
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.direct().borrow().kind
    }

    pub fn operator(&self) -> Operator {
        self.direct().borrow().operator.clone()
    }

    /// All upstream nodes in order; empty for sources.
    pub fn inputs(&self) -> Vec<StreamNode> {
        self.direct().borrow().inputs.clone()
    }

    /// The first upstream node, if any.
    pub fn input(&self) -> Option<StreamNode> {
        self.direct().borrow().inputs.first().cloned()
    }

    pub fn parallelism(&self) -> u32 {
        self.direct().borrow().parallelism
    }

    pub fn set_parallelism(&self, parallelism: u32) -> Result<(), GraphError> {
        if parallelism == 0 {
            return Err(GraphError::InvalidParallelism {
                node: self.id(),
                parallelism,
            });
        }
        self.direct().borrow_mut().parallelism = parallelism;
        Ok(())
    }

    pub fn partition(&self) -> Partition {
        self.direct().borrow().partition.clone()
    }

    fn set_partition(&self, partition: Partition) {
        self.direct().borrow_mut().partition = partition;
    }

    /// The context this node was created in, if it is still alive.
    pub fn context(&self) -> Option<StreamingContext> {
        self.direct().borrow().context.upgrade()
    }

    pub fn is_reference(&self) -> bool {
        matches!(&*self.0, NodeCell::Reference { .. })
    }

    /// The node a reference points at; `None` for direct nodes.
    pub fn referenced(&self) -> Option<&StreamNode> {
        match &*self.0 {
            NodeCell::Direct(_) => None,
            NodeCell::Reference { target, .. } => Some(target),
        }
    }

    /// Follow the reference chain to the direct node, at most
    /// [`MAX_REFERENCE_DEPTH`] hops.
    pub fn resolve(&self) -> Result<StreamNode, GraphError> {
        let mut node = self;
        for _ in 0..=MAX_REFERENCE_DEPTH {
            match node.referenced() {
                None => return Ok(node.clone()),
                Some(target) => {
                    tracing::debug!(id = node.id(), "skip reference stream");
                    node = target;
                }
            }
        }
        Err(GraphError::ReferenceChainTooLong {
            node: self.id(),
            max_depth: MAX_REFERENCE_DEPTH,
        })
    }

    /// Whether both handles point at the same underlying node.
    pub fn same_node(&self, other: &StreamNode) -> bool {
        std::ptr::eq(self.direct(), other.direct())
    }
}

impl std::fmt::Debug for StreamNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.direct().borrow();
        f.debug_struct("StreamNode")
            .field("id", &state.id)
            .field("kind", &state.kind)
            .field("language", &self.language())
            .field("reference", &self.is_reference())
            .field("operator", &state.operator.name())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/stream_node_tests.rs"]
mod tests;
