//! # Operators
//!
//! Opaque handles to user logic. The compiler never looks inside a function
//! body; it only needs to know what kind of operator it is and which language
//! implements it.

use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::types::Language;

/// The logical transformation an operator performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Source,
    Map,
    FlatMap,
    Filter,
    KeyBy,
    Reduce,
    Union,
    Join,
    Sink,
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperatorKind::Source => "Source",
            OperatorKind::Map => "Map",
            OperatorKind::FlatMap => "FlatMap",
            OperatorKind::Filter => "Filter",
            OperatorKind::KeyBy => "KeyBy",
            OperatorKind::Reduce => "Reduce",
            OperatorKind::Union => "Union",
            OperatorKind::Join => "Join",
            OperatorKind::Sink => "Sink",
        };
        f.write_str(name)
    }
}

/// Reference to a function implemented in the foreign language, resolved by
/// module and name inside the foreign runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FunctionDescriptor {
    pub module: String,
    pub name: String,
}

impl FunctionDescriptor {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

impl FromStr for FunctionDescriptor {
    type Err = GraphError;

    /// Parse `module.path.name`; the last segment is the function name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((module, name)) if !module.is_empty() && !name.is_empty() => {
                Ok(Self::new(module, name))
            }
            _ => Err(GraphError::InvalidFunctionDescriptor(s.to_string())),
        }
    }
}

/// A type-erased native function body with a display name.
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    body: Arc<dyn Any + Send + Sync>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Any + Send + Sync,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the body as a concrete type. Returns `None` on mismatch.
    pub fn downcast_ref<F: Any>(&self) -> Option<&F> {
        self.body.downcast_ref()
    }

    /// Share the body as a concrete type. Returns `None` on mismatch.
    pub fn downcast<F: Any + Send + Sync>(&self) -> Option<Arc<F>> {
        Arc::clone(&self.body).downcast::<F>().ok()
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl Eq for NativeFunction {}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// User logic attached to an operator or a partition.
///
/// Native functions compare by identity of their body, foreign ones by descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionRef {
    Native(NativeFunction),
    Foreign(FunctionDescriptor),
}

impl FunctionRef {
    pub fn native<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Any + Send + Sync,
    {
        FunctionRef::Native(NativeFunction::new(name, body))
    }

    pub fn language(&self) -> Language {
        match self {
            FunctionRef::Native(_) => Language::Native,
            FunctionRef::Foreign(_) => Language::Foreign,
        }
    }

    pub fn as_native(&self) -> Option<&NativeFunction> {
        match self {
            FunctionRef::Native(f) => Some(f),
            FunctionRef::Foreign(_) => None,
        }
    }
}

impl std::fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionRef::Native(native) => f.write_str(native.name()),
            FunctionRef::Foreign(descriptor) => write!(f, "{descriptor}"),
        }
    }
}

impl From<FunctionDescriptor> for FunctionRef {
    fn from(descriptor: FunctionDescriptor) -> Self {
        FunctionRef::Foreign(descriptor)
    }
}

/// Opaque handle to the transformation a stream node applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    kind: OperatorKind,
    language: Language,
    function: Option<FunctionRef>,
}

impl Operator {
    /// An operator backed by a user function. Its language is the function's.
    pub fn new(kind: OperatorKind, function: FunctionRef) -> Self {
        Self {
            kind,
            language: function.language(),
            function: Some(function),
        }
    }

    /// A union operator; it merges inputs and carries no user function.
    pub fn union(language: Language) -> Self {
        Self {
            kind: OperatorKind::Union,
            language,
            function: None,
        }
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn function(&self) -> Option<&FunctionRef> {
        self.function.as_ref()
    }

    /// Display name, e.g. `Map(parse_line)` or `Union`.
    pub fn name(&self) -> String {
        match &self.function {
            Some(function) => format!("{}({})", self.kind, function),
            None => self.kind.to_string(),
        }
    }
}
