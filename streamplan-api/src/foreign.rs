//! The foreign-language API surface.
//!
//! Foreign operators are referenced by [`FunctionDescriptor`] and run in the
//! foreign runtime; this crate only places them in the DAG. A foreign stream and
//! a native stream can view the same logical node through
//! [`ForeignStream::as_native`] and [`DataStream::as_foreign`].

use std::ops::Deref;

use streamplan_core::error::GraphError;
use streamplan_core::graph::{Partition, StreamNode};
use streamplan_core::operator::{FunctionDescriptor, FunctionRef, Operator, OperatorKind};
use streamplan_core::types::{Language, NodeId};

use crate::datastream::{DataStream, KeyedStream};

fn foreign_operator(kind: OperatorKind, function: FunctionDescriptor) -> Operator {
    Operator::new(kind, FunctionRef::Foreign(function))
}

/// A stream built from foreign operators.
#[derive(Clone, Debug)]
pub struct ForeignStream {
    node: StreamNode,
}

impl ForeignStream {
    pub(crate) fn from_node(node: StreamNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &StreamNode {
        &self.node
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn language(&self) -> Language {
        self.node.language()
    }

    pub fn parallelism(&self) -> u32 {
        self.node.parallelism()
    }

    pub fn set_parallelism(&self, parallelism: u32) -> Result<&Self, GraphError> {
        self.node.set_parallelism(parallelism)?;
        Ok(self)
    }

    pub fn partition(&self) -> Partition {
        self.node.partition()
    }

    pub fn map(&self, function: FunctionDescriptor) -> ForeignStream {
        self.derive(OperatorKind::Map, function)
    }

    pub fn flat_map(&self, function: FunctionDescriptor) -> ForeignStream {
        self.derive(OperatorKind::FlatMap, function)
    }

    pub fn filter(&self, function: FunctionDescriptor) -> ForeignStream {
        self.derive(OperatorKind::Filter, function)
    }

    /// Merge this stream with `others`, consumed in order after this one.
    pub fn union(&self, others: &[&ForeignStream]) -> ForeignStream {
        let rest: Vec<StreamNode> = others.iter().map(|s| s.node.clone()).collect();
        let op = Operator::union(Language::Foreign);
        ForeignStream::from_node(StreamNode::multi_input(&self.node, &rest, op))
    }

    pub fn join(&self, other: &ForeignStream, function: FunctionDescriptor) -> ForeignStream {
        let op = foreign_operator(OperatorKind::Join, function);
        ForeignStream::from_node(StreamNode::multi_input(
            &self.node,
            std::slice::from_ref(&other.node),
            op,
        ))
    }

    pub fn sink(&self, function: FunctionDescriptor) -> ForeignSink {
        let op = foreign_operator(OperatorKind::Sink, function);
        ForeignSink {
            node: StreamNode::sink(&self.node, op),
        }
    }

    /// Partition by the key `function` extracts.
    ///
    /// Fails if this stream's input is implemented in the native language.
    pub fn key_by(&self, function: FunctionDescriptor) -> Result<ForeignKeyedStream, GraphError> {
        let node = self.node.key_by(FunctionRef::Foreign(function))?;
        Ok(ForeignKeyedStream::from_node(node))
    }

    pub fn broadcast(&self) -> Result<&Self, GraphError> {
        self.node.broadcast()?;
        Ok(self)
    }

    /// Route elements with the foreign partition `function`.
    pub fn partition_by(&self, function: FunctionDescriptor) -> Result<&Self, GraphError> {
        self.node
            .partition_by(Partition::Custom(FunctionRef::Foreign(function)))?;
        Ok(self)
    }

    /// View this stream as a native stream of `T`. The element type is the
    /// caller's promise about what the foreign operators produce.
    pub fn as_native<T>(&self) -> DataStream<T> {
        DataStream::from_node(StreamNode::reference(&self.node, Language::Native))
    }

    fn derive(&self, kind: OperatorKind, function: FunctionDescriptor) -> ForeignStream {
        let op = foreign_operator(kind, function);
        ForeignStream::from_node(StreamNode::transform(&self.node, op))
    }
}

/// A foreign stream partitioned by key.
#[derive(Clone, Debug)]
pub struct ForeignKeyedStream {
    stream: ForeignStream,
}

impl ForeignKeyedStream {
    pub(crate) fn from_node(node: StreamNode) -> Self {
        Self {
            stream: ForeignStream::from_node(node),
        }
    }

    pub fn reduce(&self, function: FunctionDescriptor) -> ForeignStream {
        self.stream.derive(OperatorKind::Reduce, function)
    }

    /// View this keyed stream as a native keyed stream.
    pub fn as_native<T, K>(&self) -> KeyedStream<T, K> {
        KeyedStream::from_node(StreamNode::reference(&self.stream.node, Language::Native))
    }
}

impl Deref for ForeignKeyedStream {
    type Target = ForeignStream;

    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

/// The terminal node of a foreign stream.
#[derive(Clone, Debug)]
pub struct ForeignSink {
    node: StreamNode,
}

impl ForeignSink {
    pub fn node(&self) -> &StreamNode {
        &self.node
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn set_parallelism(&self, parallelism: u32) -> Result<&Self, GraphError> {
        self.node.set_parallelism(parallelism)?;
        Ok(self)
    }
}
