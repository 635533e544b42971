use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Deref;

use streamplan_core::error::GraphError;
use streamplan_core::graph::{Partition, StreamNode};
use streamplan_core::operator::{FunctionRef, Operator, OperatorKind};
use streamplan_core::partitioner::KeySelector;
use streamplan_core::types::{Language, NodeId, StreamData};

use crate::foreign::{ForeignKeyedStream, ForeignStream};
use crate::function::{
    FilterFunction, FlatMapFunction, JoinFunction, MapFunction, ReduceFunction, SinkFunction,
};

fn native_operator<B>(kind: OperatorKind, name: &str, body: B) -> Operator
where
    B: Send + Sync + 'static,
{
    Operator::new(kind, FunctionRef::native(name, body))
}

/// A stream of elements of type `T`, built from native operators.
///
/// Created by [`StreamExecutionEnvironment`](crate::environment::StreamExecutionEnvironment)
/// sources or by transforming another stream. Every transformation adds a node
/// to the job's stream DAG; nothing runs until the job graph is handed to a
/// scheduler.
pub struct DataStream<T> {
    node: StreamNode,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for DataStream<T> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<T> std::fmt::Debug for DataStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DataStream").field(&self.node).finish()
    }
}

impl<T> DataStream<T> {
    pub(crate) fn from_node(node: StreamNode) -> Self {
        Self {
            node,
            _phantom: PhantomData,
        }
    }

    /// The underlying DAG node handle.
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
}

impl<T: StreamData> DataStream<T> {
    /// Apply a map function to this stream.
    pub fn map<R, F>(&self, map_fn: F) -> DataStream<R>
    where
        R: StreamData,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let op = native_operator(OperatorKind::Map, "map", MapFunction::new(map_fn));
        DataStream::from_node(StreamNode::transform(&self.node, op))
    }

    /// Apply a flat-map function to this stream.
    pub fn flat_map<R, I, F>(&self, flat_map_fn: F) -> DataStream<R>
    where
        R: StreamData,
        I: IntoIterator<Item = R>,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        let body =
            FlatMapFunction::<T, R>::new(move |value| flat_map_fn(value).into_iter().collect());
        let op = native_operator(OperatorKind::FlatMap, "flat_map", body);
        DataStream::from_node(StreamNode::transform(&self.node, op))
    }

    /// Keep the elements for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> DataStream<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let op = native_operator(OperatorKind::Filter, "filter", FilterFunction::new(predicate));
        DataStream::from_node(StreamNode::transform(&self.node, op))
    }

    /// Merge this stream with `other`. The union consumes both, in that order.
    pub fn union(&self, other: &DataStream<T>) -> DataStream<T> {
        let op = Operator::union(Language::Native);
        DataStream::from_node(StreamNode::multi_input(
            &self.node,
            std::slice::from_ref(&other.node),
            op,
        ))
    }

    /// Join this stream with `other`; `join_fn` decides what a matching pair produces.
    pub fn join<O, R, F>(&self, other: &DataStream<O>, join_fn: F) -> DataStream<R>
    where
        O: StreamData,
        R: StreamData,
        F: Fn(&T, &O) -> Option<R> + Send + Sync + 'static,
    {
        let op = native_operator(OperatorKind::Join, "join", JoinFunction::new(join_fn));
        DataStream::from_node(StreamNode::multi_input(
            &self.node,
            std::slice::from_ref(&other.node),
            op,
        ))
    }

    /// Terminate this stream in a sink. The sink joins the job.
    pub fn sink<F>(&self, sink_fn: F) -> DataStreamSink<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let op = native_operator(OperatorKind::Sink, "sink", SinkFunction::new(sink_fn));
        DataStreamSink::from_node(StreamNode::sink(&self.node, op))
    }

    /// Partition the stream by key, returning a [`KeyedStream`].
    ///
    /// Fails if this stream's input is implemented in the foreign language.
    pub fn key_by<K, F>(&self, key_fn: F) -> Result<KeyedStream<T, K>, GraphError>
    where
        K: Hash + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let key_function = FunctionRef::native("key_by", KeySelector::new(key_fn));
        let node = self.node.key_by(key_function)?;
        Ok(KeyedStream::from_node(node))
    }

    /// Send every element to all downstream instances.
    pub fn broadcast(&self) -> Result<&Self, GraphError> {
        self.node.broadcast()?;
        Ok(self)
    }

    /// Route elements with `partition`.
    pub fn partition_by(&self, partition: Partition) -> Result<&Self, GraphError> {
        self.node.partition_by(partition)?;
        Ok(self)
    }

    /// Route elements with a custom function `(element, num_partitions) -> targets`.
    pub fn partition_with<F>(&self, route: F) -> Result<&Self, GraphError>
    where
        F: Fn(&T, usize) -> Vec<usize> + Send + Sync + 'static,
    {
        self.partition_by(Partition::custom("partition", route))
    }

    /// View this stream as a foreign stream. Both views are the same logical
    /// stream: same id, shared parallelism and partition.
    pub fn as_foreign(&self) -> ForeignStream {
        ForeignStream::from_node(StreamNode::reference(&self.node, Language::Foreign))
    }
}

/// A stream partitioned by a key of type `K`.
///
/// Dereferences to the underlying [`DataStream`], so every stream operation is
/// available; [`reduce`](Self::reduce) folds elements per key.
pub struct KeyedStream<T, K> {
    stream: DataStream<T>,
    _key: PhantomData<fn() -> K>,
}

impl<T, K> Clone for KeyedStream<T, K> {
    fn clone(&self) -> Self {
        Self::from_node(self.stream.node.clone())
    }
}

impl<T, K> std::fmt::Debug for KeyedStream<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeyedStream").field(&self.stream.node).finish()
    }
}

impl<T, K> KeyedStream<T, K> {
    pub(crate) fn from_node(node: StreamNode) -> Self {
        Self {
            stream: DataStream::from_node(node),
            _key: PhantomData,
        }
    }
}

impl<T: StreamData, K> KeyedStream<T, K> {
    /// Fold elements with the same key by repeatedly applying `reduce_fn`.
    pub fn reduce<F>(&self, reduce_fn: F) -> DataStream<T>
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let op = native_operator(OperatorKind::Reduce, "reduce", ReduceFunction::new(reduce_fn));
        DataStream::from_node(StreamNode::transform(&self.stream.node, op))
    }

    /// View this keyed stream as a foreign keyed stream.
    pub fn as_foreign(&self) -> ForeignKeyedStream {
        ForeignKeyedStream::from_node(StreamNode::reference(&self.stream.node, Language::Foreign))
    }
}

impl<T, K> Deref for KeyedStream<T, K> {
    type Target = DataStream<T>;

    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

/// The terminal node of a stream. Sinks have no downstream operations.
pub struct DataStreamSink<T> {
    node: StreamNode,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> DataStreamSink<T> {
    pub(crate) fn from_node(node: StreamNode) -> Self {
        Self {
            node,
            _phantom: PhantomData,
        }
    }

    pub fn node(&self) -> &StreamNode {
        &self.node
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn parallelism(&self) -> u32 {
        self.node.parallelism()
    }

    pub fn set_parallelism(&self, parallelism: u32) -> Result<&Self, GraphError> {
        self.node.set_parallelism(parallelism)?;
        Ok(self)
    }
}
