//! # Partitioner
//!
//! Routing rules behind native [`Partition`](crate::graph::Partition) strategies.
//! The job graph only carries the strategies; a runtime reifies them with
//! [`Partition::partitioner`](crate::graph::Partition::partitioner).

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHasher;

/// Trait for partitioning data across parallel instances.
pub trait Partitioner<T>: Send + Sync {
    /// Determine which partitions (each in 0..num_partitions) receive this value.
    fn partition(&self, value: &T, num_partitions: usize) -> Vec<usize>;
}

/// Extracts a key from a record and hashes it.
///
/// The same selector is shared by a KeyBy operator and the key-based partition
/// on its output, so both see one function identity.
pub struct KeySelector<T> {
    hash_key: Box<dyn Fn(&T) -> u64 + Send + Sync>,
}

impl<T> KeySelector<T> {
    pub fn new<K, F>(key_fn: F) -> Self
    where
        K: Hash,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            hash_key: Box::new(move |value| {
                // ahash for SIMD-accelerated hashing.
                let mut hasher = AHasher::default();
                key_fn(value).hash(&mut hasher);
                hasher.finish()
            }),
        }
    }

    pub fn key_hash(&self, value: &T) -> u64 {
        (self.hash_key)(value)
    }
}

/// User supplied routing function: `(record, num_partitions) -> targets`.
pub struct CustomPartition<T> {
    route: Box<dyn Fn(&T, usize) -> Vec<usize> + Send + Sync>,
}

impl<T> CustomPartition<T> {
    pub fn new<F>(route: F) -> Self
    where
        F: Fn(&T, usize) -> Vec<usize> + Send + Sync + 'static,
    {
        Self {
            route: Box::new(route),
        }
    }
}

/// Hash-based partitioner over a shared key selector.
pub struct HashPartitioner<T> {
    selector: Arc<KeySelector<T>>,
}

impl<T> HashPartitioner<T> {
    pub fn new(selector: Arc<KeySelector<T>>) -> Self {
        Self { selector }
    }
}

impl<T> Partitioner<T> for HashPartitioner<T> {
    fn partition(&self, value: &T, num_partitions: usize) -> Vec<usize> {
        if num_partitions == 0 {
            return Vec::new();
        }
        let hash = self.selector.key_hash(value);
        vec![(hash % num_partitions as u64) as usize]
    }
}

/// Round-robin partitioner.
#[derive(Debug, Default)]
pub struct RoundRobinPartitioner {
    counter: AtomicUsize,
}

impl RoundRobinPartitioner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Partitioner<T> for RoundRobinPartitioner {
    fn partition(&self, _value: &T, num_partitions: usize) -> Vec<usize> {
        if num_partitions == 0 {
            return Vec::new();
        }
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        vec![count % num_partitions]
    }
}

/// Sends every record to all downstream instances.
#[derive(Debug, Default)]
pub struct BroadcastPartitioner;

impl<T> Partitioner<T> for BroadcastPartitioner {
    fn partition(&self, _value: &T, num_partitions: usize) -> Vec<usize> {
        (0..num_partitions).collect()
    }
}

/// Delegates to a [`CustomPartition`]; targets outside the range are dropped.
pub struct CustomPartitioner<T> {
    custom: Arc<CustomPartition<T>>,
}

impl<T> CustomPartitioner<T> {
    pub fn new(custom: Arc<CustomPartition<T>>) -> Self {
        Self { custom }
    }
}

impl<T> Partitioner<T> for CustomPartitioner<T> {
    fn partition(&self, value: &T, num_partitions: usize) -> Vec<usize> {
        let mut targets = (self.custom.route)(value, num_partitions);
        targets.retain(|&target| target < num_partitions);
        targets
    }
}

#[cfg(test)]
#[path = "tests/partitioner_tests.rs"]
mod tests;
