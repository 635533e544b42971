use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Unique identifier for stream nodes and the job vertices compiled from them.
pub type NodeId = u32;

/// The language an operator is implemented in.
///
/// `Native` operators are Rust closures owned by this process. `Foreign`
/// operators are referenced by descriptor and run in another language runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Native,
    Foreign,
}

impl Language {
    /// The language on the other side of the bridge.
    pub fn other(self) -> Self {
        match self {
            Language::Native => Language::Foreign,
            Language::Foreign => Language::Native,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Native => "native",
            Language::Foreign => "foreign",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = GraphError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Language::Native),
            "foreign" => Ok(Language::Foreign),
            _ => Err(GraphError::UnknownLanguage(tag.to_string())),
        }
    }
}

/// Trait bound for element types of typed streams.
/// Elements never cross threads during graph construction, but the functions
/// applied to them end up in a `Send + Sync` job graph.
pub trait StreamData: Send + 'static {}

// Blanket implementation: any type satisfying the bounds is StreamData.
impl<T> StreamData for T where T: Send + 'static {}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
