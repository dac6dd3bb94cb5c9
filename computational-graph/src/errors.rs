//! Error types for building and addressing computational graphs.
//!
//! Node evaluation itself cannot fail. Errors arise when a graph is described
//! by names: validating a [`GraphSpec`](crate::graph::GraphSpec), building a
//! graph, or reaching a node of a built [`Graph`](crate::graph::Graph).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type of the crate.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph description is invalid.
    #[error("{0}")]
    Validation(#[from] GraphValidationError),

    /// A name does not refer to any node of the graph.
    #[error("{0}")]
    UnknownNode(#[from] UnknownNodeError),

    /// A value was assigned to a node that is not an input.
    #[error("Node '{0}' is not an input and cannot be set")]
    NotAnInput(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The logging subscriber could not be installed.
    #[error("Logging setup error: {0}")]
    Logging(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Diagnostic metadata attached to validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "GRAPH-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
}

impl ErrorInfo {
    /// Creates new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Uses the canned suggestion for this code as the fix hint, if any.
    #[must_use]
    pub fn with_default_hint(self) -> Self {
        match ErrorSuggestions::get(&self.code) {
            Some(hint) => self.with_fix_hint(hint),
            None => self,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));
        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        map
    }
}

/// Error raised when a graph description fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GraphValidationError {
    /// The error message.
    pub message: String,
    /// The nodes involved in the error.
    pub nodes: Vec<String>,
    /// Optional diagnostic info.
    pub error_info: Option<ErrorInfo>,
}

impl GraphValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            nodes: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the nodes involved.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<String>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Sets the diagnostic info.
    #[must_use]
    pub fn with_error_info(mut self, info: ErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("message".to_string(), serde_json::json!(self.message));
        map.insert("nodes".to_string(), serde_json::json!(self.nodes));
        if let Some(ref info) = self.error_info {
            let info_map: serde_json::Map<String, serde_json::Value> =
                info.to_dict().into_iter().collect();
            map.insert("error_info".to_string(), serde_json::Value::Object(info_map));
        }
        map
    }
}

/// Error raised when a graph description contains a cycle.
#[derive(Debug, Clone, Error)]
#[error("Cycle detected in graph: {}", cycle_path.join(" -> "))]
pub struct CycleDetectedError {
    /// The path of nodes forming the cycle, first node repeated at the end.
    pub cycle_path: Vec<String>,
    /// Diagnostic info.
    pub error_info: ErrorInfo,
}

impl CycleDetectedError {
    /// Creates a new cycle detected error.
    #[must_use]
    pub fn new(cycle_path: Vec<String>) -> Self {
        let info = ErrorInfo::new(
            codes::CYCLE,
            format!("Graph contains a dependency cycle: {}", cycle_path.join(" -> ")),
        )
        .with_default_hint();

        Self {
            cycle_path,
            error_info: info,
        }
    }
}

impl From<CycleDetectedError> for GraphValidationError {
    fn from(err: CycleDetectedError) -> Self {
        Self {
            message: err.to_string(),
            nodes: err.cycle_path.clone(),
            error_info: Some(err.error_info),
        }
    }
}

/// Error raised when a name does not refer to a node of the graph.
#[derive(Debug, Clone, Error)]
#[error("Unknown node '{name}'")]
pub struct UnknownNodeError {
    /// The name that was looked up.
    pub name: String,
}

impl UnknownNodeError {
    /// Creates a new unknown node error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Error codes carried in [`ErrorInfo::code`].
pub mod codes {
    /// The graph has nothing in it.
    pub const EMPTY: &str = "GRAPH-EMPTY";
    /// Two nodes share a name.
    pub const DUPLICATE: &str = "GRAPH-DUPLICATE";
    /// An operand or output refers to a name that does not exist.
    pub const MISSING_NODE: &str = "GRAPH-MISSING_NODE";
    /// A node uses itself as an operand.
    pub const SELF_REF: &str = "GRAPH-SELF_REF";
    /// Operands form a cycle.
    pub const CYCLE: &str = "GRAPH-CYCLE";
    /// No output node could be selected.
    pub const NO_OUTPUT: &str = "GRAPH-NO_OUTPUT";
    /// A node name is empty or malformed.
    pub const BAD_NAME: &str = "GRAPH-BAD_NAME";
}

/// Provides default suggestions for the error codes.
pub struct ErrorSuggestions;

impl ErrorSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            codes::EMPTY => Some("Declare at least one input or node before building."),
            codes::DUPLICATE => Some(
                "Inputs and nodes share one namespace. Rename one of the conflicting entries.",
            ),
            codes::MISSING_NODE => Some(
                "Check operand names for typos and make sure every referenced input is declared.",
            ),
            codes::SELF_REF => Some("A node cannot use its own value as an operand."),
            codes::CYCLE => Some(
                "Remove one of the operand references in the cycle. \
                 Feed the value through an input instead.",
            ),
            codes::NO_OUTPUT => Some("Set `output` to the name of an existing node or input."),
            codes::BAD_NAME => Some(
                "Names must be non-empty and may not contain whitespace or the sequence '->'.",
            ),
            _ => None,
        }
    }
}
