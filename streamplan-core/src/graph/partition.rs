use std::sync::Arc;

use crate::error::GraphError;
use crate::operator::{FunctionDescriptor, FunctionRef, NativeFunction};
use crate::partitioner::{
    BroadcastPartitioner, CustomPartition, CustomPartitioner, HashPartitioner, KeySelector,
    Partitioner, RoundRobinPartitioner,
};
use crate::types::Language;

/// Module holding the foreign runtime's built-in partitions.
pub const FOREIGN_PARTITION_MODULE: &str = "streamplan.partition";

/// How data is partitioned between a producing node and its consumers.
///
/// The strategy lives on the producing node and applies to every edge leaving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition {
    /// Cycle through downstream instances.
    RoundRobin,
    /// Send to all downstream instances.
    Broadcast,
    /// Hash-partition by the key a [`KeySelector`] extracts.
    KeyBased(FunctionRef),
    /// User routing function, see [`CustomPartition`].
    Custom(FunctionRef),
    /// Routing implemented by the foreign runtime.
    Foreign(FunctionDescriptor),
}

impl Partition {
    /// The partition a freshly constructed node starts with.
    pub fn default_for(language: Language) -> Self {
        match language {
            Language::Native => Partition::RoundRobin,
            Language::Foreign => Partition::Foreign(Self::foreign_builtin("RoundRobinPartition")),
        }
    }

    /// The broadcast partition of the given language.
    pub fn broadcast_for(language: Language) -> Self {
        match language {
            Language::Native => Partition::Broadcast,
            Language::Foreign => Partition::Foreign(Self::foreign_builtin("BroadcastPartition")),
        }
    }

    /// The partition installed on the output of a key-by with `key_function`.
    ///
    /// Foreign key-bys route with the foreign runtime's key partition, which
    /// reads the key the operator attached to each record.
    pub fn key_based_for(key_function: &FunctionRef) -> Self {
        match key_function {
            FunctionRef::Native(_) => Partition::KeyBased(key_function.clone()),
            FunctionRef::Foreign(_) => Partition::Foreign(Self::foreign_builtin("KeyPartition")),
        }
    }

    /// A native custom partition routing records of type `T`.
    pub fn custom<T, F>(name: &str, route: F) -> Self
    where
        T: 'static,
        F: Fn(&T, usize) -> Vec<usize> + Send + Sync + 'static,
    {
        Partition::Custom(FunctionRef::native(name, CustomPartition::new(route)))
    }

    fn foreign_builtin(name: &str) -> FunctionDescriptor {
        FunctionDescriptor::new(FOREIGN_PARTITION_MODULE, name)
    }

    /// Language the routing rule is implemented in.
    pub fn language(&self) -> Language {
        match self {
            Partition::RoundRobin | Partition::Broadcast => Language::Native,
            Partition::KeyBased(function) | Partition::Custom(function) => function.language(),
            Partition::Foreign(_) => Language::Foreign,
        }
    }

    /// The key extractor of a key-based partition.
    pub fn key_function(&self) -> Option<&FunctionRef> {
        match self {
            Partition::KeyBased(function) => Some(function),
            _ => None,
        }
    }

    /// Reify a native strategy into a router for records of type `T`.
    pub fn partitioner<T: 'static>(&self) -> Result<Box<dyn Partitioner<T>>, GraphError> {
        match self {
            Partition::RoundRobin => Ok(Box::new(RoundRobinPartitioner::new())),
            Partition::Broadcast => Ok(Box::new(BroadcastPartitioner)),
            Partition::KeyBased(FunctionRef::Native(function)) => {
                let selector = self.native_body::<KeySelector<T>>(function)?;
                Ok(Box::new(HashPartitioner::new(selector)))
            }
            Partition::Custom(FunctionRef::Native(function)) => {
                let custom = self.native_body::<CustomPartition<T>>(function)?;
                Ok(Box::new(CustomPartitioner::new(custom)))
            }
            Partition::KeyBased(FunctionRef::Foreign(descriptor))
            | Partition::Custom(FunctionRef::Foreign(descriptor))
            | Partition::Foreign(descriptor) => Err(GraphError::ForeignPartition {
                descriptor: descriptor.to_string(),
            }),
        }
    }

    fn native_body<B: Send + Sync + 'static>(
        &self,
        function: &NativeFunction,
    ) -> Result<Arc<B>, GraphError> {
        function
            .downcast::<B>()
            .ok_or_else(|| GraphError::PartitionTypeMismatch {
                partition: self.to_string(),
            })
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partition::RoundRobin => f.write_str("RoundRobin"),
            Partition::Broadcast => f.write_str("Broadcast"),
            Partition::KeyBased(function) => write!(f, "KeyBased({function})"),
            Partition::Custom(function) => write!(f, "Custom({function})"),
            Partition::Foreign(descriptor) => write!(f, "Foreign({descriptor})"),
        }
    }
}

#[cfg(test)]
#[path = "tests/partition_tests.rs"]
mod tests;
