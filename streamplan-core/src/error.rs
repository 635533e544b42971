//! Error types for stream construction and job graph compilation.

use crate::types::{Language, NodeId};

/// Errors raised while building a stream DAG or compiling it into a [`JobGraph`].
///
/// Usage errors surface at the DSL call that caused them. Invariant violations
/// abort [`JobGraphBuilder::build`] and mean the DAG was assembled incorrectly.
///
/// [`JobGraph`]: crate::graph::JobGraph
/// [`JobGraphBuilder::build`]: crate::graph::JobGraphBuilder::build
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A partition related method was called on a stream whose input stream
    /// is implemented in the other language.
    #[error(
        "partition related methods can't be called on {language} stream {node} \
         because its input stream {input} is a {input_language} stream"
    )]
    CrossLanguagePartition {
        /// The stream the partition call was made on.
        node: NodeId,
        /// Language of the API surface used for the call.
        language: Language,
        /// The offending input stream.
        input: NodeId,
        /// Language the input stream is implemented in.
        input_language: Language,
    },

    /// Parallelism must be at least 1.
    #[error("invalid parallelism {parallelism} for stream {node}")]
    InvalidParallelism {
        /// The stream being configured.
        node: NodeId,
        /// The rejected value.
        parallelism: u32,
    },

    /// A language tag did not name a supported language.
    #[error("unsupported language `{0}`")]
    UnknownLanguage(String),

    /// A configuration entry was not of the form `key=value`.
    #[error("invalid config entry `{0}`, expected key=value")]
    InvalidConfigEntry(String),

    /// A foreign function reference was not of the form `module.name`.
    #[error("invalid function descriptor `{0}`, expected module.name")]
    InvalidFunctionDescriptor(String),

    /// The builder was handed a stream that is not a sink.
    #[error("stream {node} is not a sink")]
    NotASink {
        /// The offending root stream.
        node: NodeId,
    },

    /// A foreign partition cannot be turned into a native partitioner.
    #[error("partition `{descriptor}` is implemented in the foreign language")]
    ForeignPartition {
        /// Display form of the foreign partition function.
        descriptor: String,
    },

    /// A native partition body did not match the requested record type.
    #[error("partition `{partition}` does not route the requested record type")]
    PartitionTypeMismatch {
        /// Display form of the partition.
        partition: String,
    },

    /// A resolved stream reports a language that disagrees with its operator.
    #[error(
        "stream {node} is a {language} stream but its operator is {operator_language}; \
         reference streams should have been skipped"
    )]
    LanguageMismatch {
        /// The stream that failed the check.
        node: NodeId,
        /// Language reported by the stream.
        language: Language,
        /// Language reported by its operator.
        operator_language: Language,
    },

    /// A stream variant the builder cannot classify reached classification.
    #[error("unsupported stream {node}")]
    UnsupportedStream {
        /// The unclassifiable stream.
        node: NodeId,
    },

    /// Following a chain of reference streams did not reach a real stream.
    #[error("reference chain starting at stream {node} exceeds {max_depth} hops")]
    ReferenceChainTooLong {
        /// Id reported by the head of the chain.
        node: NodeId,
        /// The depth limit that was hit.
        max_depth: usize,
    },
}

impl GraphError {
    /// Whether this error indicates a bug in DAG construction rather than a
    /// misuse by the caller.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            GraphError::LanguageMismatch { .. }
                | GraphError::UnsupportedStream { .. }
                | GraphError::ReferenceChainTooLong { .. }
        )
    }
}
