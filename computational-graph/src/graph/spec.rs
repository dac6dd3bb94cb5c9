//! Declarative graph descriptions.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::builder::check_name;
use super::{Graph, GraphBuilder};
use crate::errors::{codes, CycleDetectedError, ErrorInfo, GraphError, GraphValidationError};

/// An operation and the names of its operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// `lhs + rhs`.
    Add {
        /// Left operand.
        lhs: String,
        /// Right operand.
        rhs: String,
    },
    /// `lhs * rhs`.
    Mul {
        /// Left operand.
        lhs: String,
        /// Right operand.
        rhs: String,
    },
    /// `sin(arg)`.
    Sin {
        /// Operand.
        arg: String,
    },
    /// `base ^ exponent`.
    Pow {
        /// Operand.
        base: String,
        /// Constant exponent.
        exponent: f32,
    },
}

impl Operation {
    /// Creates an addition.
    #[must_use]
    pub fn add(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::Add {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Creates a multiplication.
    #[must_use]
    pub fn mul(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self::Mul {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Creates a sine.
    #[must_use]
    pub fn sin(arg: impl Into<String>) -> Self {
        Self::Sin { arg: arg.into() }
    }

    /// Creates a power with a constant exponent.
    #[must_use]
    pub fn pow(base: impl Into<String>, exponent: f32) -> Self {
        Self::Pow {
            base: base.into(),
            exponent,
        }
    }

    /// Names of the operands, in argument order.
    #[must_use]
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Self::Add { lhs, rhs } | Self::Mul { lhs, rhs } => vec![lhs.as_str(), rhs.as_str()],
            Self::Sin { arg } => vec![arg.as_str()],
            Self::Pow { base, .. } => vec![base.as_str()],
        }
    }

    /// Short name of the operation, as written in the `op` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Mul { .. } => "mul",
            Self::Sin { .. } => "sin",
            Self::Pow { .. } => "pow",
        }
    }
}

/// A named operation node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique name of the node.
    pub name: String,
    /// The operation the node performs.
    #[serde(flatten)]
    pub operation: Operation,
}

impl NodeSpec {
    /// Creates a node specification.
    #[must_use]
    pub fn new(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }
}

/// A named input with an optional initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Unique name of the input.
    pub name: String,
    /// Initial value; `0.0` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
}

impl InputSpec {
    /// Creates an input specification without an initial value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub const fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }
}

/// Specification of an entire graph.
///
/// Unlike [`GraphBuilder`], nodes may be listed in any order: validation
/// sorts them so that operands come first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    /// The graph name.
    pub name: String,
    /// Input declarations.
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    /// Operation nodes.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Name of the output node. Defaults to the last declared node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl GraphSpec {
    /// Creates an empty specification.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an input.
    #[must_use]
    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    /// Adds an operation node.
    #[must_use]
    pub fn with_node(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.nodes.push(NodeSpec::new(name, operation));
        self
    }

    /// Sets the output node.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Parses a specification from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a specification from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serializes the specification to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The output node name, explicit or defaulted.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        self.output
            .as_deref()
            .or_else(|| self.nodes.last().map(|n| n.name.as_str()))
            .or_else(|| self.inputs.last().map(|i| i.name.as_str()))
    }

    /// Validates the specification.
    ///
    /// Returns the operation node names in dependency order (every node
    /// after its operands).
    pub fn validate(&self) -> Result<Vec<String>, GraphValidationError> {
        if self.inputs.is_empty() && self.nodes.is_empty() {
            return Err(GraphValidationError::new(format!("Graph '{}' is empty", self.name))
                .with_error_info(
                    ErrorInfo::new(codes::EMPTY, "Cannot build an empty graph").with_default_hint(),
                ));
        }

        let mut known: HashSet<&str> = HashSet::new();
        let names = self
            .inputs
            .iter()
            .map(|i| i.name.as_str())
            .chain(self.nodes.iter().map(|n| n.name.as_str()));
        for name in names {
            check_name(name)?;
            if !known.insert(name) {
                return Err(duplicate_error(name));
            }
        }

        for node in &self.nodes {
            for operand in node.operation.operands() {
                if operand == node.name {
                    return Err(self_reference_error(&node.name));
                }
                if !known.contains(operand) {
                    return Err(missing_operand_error(&node.name, operand));
                }
            }
        }

        let order = self.dependency_order().map_err(GraphValidationError::from)?;

        if let Some(output) = self.output_name() {
            if !known.contains(output) {
                return Err(unknown_output_error(output));
            }
        }

        Ok(order)
    }

    /// Validates the specification and builds the graph.
    pub fn build(&self) -> Result<Graph, GraphError> {
        let order = self.validate()?;
        let by_name: HashMap<&str, &NodeSpec> =
            self.nodes.iter().map(|n| (n.name.as_str(), n)).collect();

        let mut builder = GraphBuilder::new(&self.name);
        for input in &self.inputs {
            builder.add_input(&input.name, input.value.unwrap_or_default())?;
        }
        for name in &order {
            if let Some(spec) = by_name.get(name.as_str()) {
                builder.add_node_spec((*spec).clone())?;
            }
        }
        if let Some(output) = self.output_name() {
            builder = builder.output(output);
        }

        Ok(builder.build()?)
    }

    /// Topologically sorts operation nodes, detecting cycles.
    fn dependency_order(&self) -> Result<Vec<String>, CycleDetectedError> {
        let operands: HashMap<&str, Vec<&str>> = self
            .nodes
            .iter()
            .map(|n| (n.name.as_str(), n.operation.operands()))
            .collect();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        // (node, index of the next operand to visit)
        let mut stack: Vec<(&str, usize)> = Vec::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        // Declaration order keeps the result deterministic.
        for root in &self.nodes {
            let root = root.name.as_str();
            if visited.contains(root) {
                continue;
            }
            on_path.insert(root);
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let deps = operands.get(node).map_or(&[][..], Vec::as_slice);

                let Some(&dep) = deps.get(next) else {
                    stack.pop();
                    on_path.remove(node);
                    visited.insert(node);
                    order.push(node.to_string());
                    continue;
                };
                frame.1 += 1;

                if on_path.contains(dep) {
                    let start = stack.iter().position(|(n, _)| *n == dep).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|(n, _)| (*n).to_string()).collect();
                    cycle.push(dep.to_string());
                    return Err(CycleDetectedError::new(cycle));
                }
                // Inputs are leaves.
                if !visited.contains(dep) && operands.contains_key(dep) {
                    on_path.insert(dep);
                    stack.push((dep, 0));
                }
            }
        }

        Ok(order)
    }
}

pub(super) fn duplicate_error(name: &str) -> GraphValidationError {
    GraphValidationError::new(format!("Name '{name}' is declared more than once"))
        .with_nodes(vec![name.to_string()])
        .with_error_info(
            ErrorInfo::new(codes::DUPLICATE, format!("Duplicate name '{name}'"))
                .with_default_hint(),
        )
}

pub(super) fn self_reference_error(name: &str) -> GraphValidationError {
    GraphValidationError::new(format!("Node '{name}' cannot use itself as an operand"))
        .with_nodes(vec![name.to_string()])
        .with_error_info(
            ErrorInfo::new(codes::SELF_REF, format!("Node '{name}' references itself"))
                .with_default_hint(),
        )
}

pub(super) fn missing_operand_error(node: &str, operand: &str) -> GraphValidationError {
    GraphValidationError::new(format!("Node '{node}' uses unknown operand '{operand}'"))
        .with_nodes(vec![node.to_string(), operand.to_string()])
        .with_error_info(
            ErrorInfo::new(codes::MISSING_NODE, format!("Operand '{operand}' not found"))
                .with_default_hint(),
        )
}

pub(super) fn unknown_output_error(output: &str) -> GraphValidationError {
    GraphValidationError::new(format!("Output '{output}' does not name a node or input"))
        .with_nodes(vec![output.to_string()])
        .with_error_info(
            ErrorInfo::new(codes::NO_OUTPUT, format!("Output '{output}' not found"))
                .with_default_hint(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TASK_JSON: &str = r#"{
        "name": "task",
        "inputs": [
            {"name": "x1", "value": 1.0},
            {"name": "x2", "value": 2.0},
            {"name": "x3", "value": 3.0}
        ],
        "nodes": [
            {"name": "result", "op": "add", "lhs": "x1", "rhs": "scaled"},
            {"name": "scaled", "op": "mul", "lhs": "x2", "rhs": "wave"},
            {"name": "wave", "op": "sin", "arg": "shifted"},
            {"name": "shifted", "op": "add", "lhs": "x2", "rhs": "cube"},
            {"name": "cube", "op": "pow", "base": "x3", "exponent": 3.0}
        ],
        "output": "result"
    }"#;

    fn chain() -> GraphSpec {
        GraphSpec::new("chain")
            .with_input(InputSpec::new("x"))
            .with_node("a", Operation::sin("x"))
            .with_node("b", Operation::pow("a", 2.0))
    }

    #[test]
    fn test_parse_json() {
        let spec = GraphSpec::from_json_str(TASK_JSON).unwrap();
        assert_eq!(spec.name, "task");
        assert_eq!(spec.inputs.len(), 3);
        assert_eq!(spec.inputs[0].value, Some(1.0));
        assert_eq!(spec.nodes[4].operation, Operation::pow("x3", 3.0));
        assert_eq!(spec.output_name(), Some("result"));
    }

    #[test]
    fn test_json_shape() {
        let json = chain().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["nodes"][1],
            serde_json::json!({"name": "b", "op": "pow", "base": "a", "exponent": 2.0})
        );
        assert!(value["inputs"][0].get("value").is_none());
        assert!(value.get("output").is_none());
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let json = r#"{"name": "g", "nodes": [{"name": "n", "op": "tan", "arg": "x"}]}"#;
        let err = GraphSpec::from_json_str(json).unwrap_err();
        assert!(matches!(err, GraphError::Serialization(_)));
    }

    #[test]
    fn test_operands() {
        assert_eq!(Operation::add("a", "b").operands(), vec!["a", "b"]);
        assert_eq!(Operation::sin("a").operands(), vec!["a"]);
        assert_eq!(Operation::pow("a", 2.0).operands(), vec!["a"]);
        assert_eq!(Operation::mul("a", "b").kind(), "mul");
    }

    #[test]
    fn test_validate_sorts_nodes() {
        let spec = GraphSpec::from_json_str(TASK_JSON).unwrap();
        let order = spec.validate().unwrap();
        assert_eq!(order, vec!["cube", "shifted", "wave", "scaled", "result"]);
    }

    #[test]
    fn test_default_output_is_last_node() {
        assert_eq!(chain().output_name(), Some("b"));
        let inputs_only = GraphSpec::new("g")
            .with_input(InputSpec::new("a"))
            .with_input(InputSpec::new("b"));
        assert_eq!(inputs_only.output_name(), Some("b"));
    }

    #[test]
    fn test_empty_spec() {
        let err = GraphSpec::new("nothing").validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::EMPTY));
    }

    #[test]
    fn test_duplicate_names() {
        let spec = chain().with_node("x", Operation::sin("a"));
        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::DUPLICATE));
        assert_eq!(err.nodes, vec!["x".to_string()]);
    }

    #[test]
    fn test_bad_name() {
        let spec = chain().with_node("a -> b", Operation::sin("a"));
        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::BAD_NAME));

        let spec = GraphSpec::new("g").with_input(InputSpec::new(""));
        assert_eq!(spec.validate().unwrap_err().code(), Some(codes::BAD_NAME));
    }

    #[test]
    fn test_missing_operand() {
        let spec = chain().with_node("c", Operation::add("b", "nope"));
        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::MISSING_NODE));
        assert_eq!(err.nodes, vec!["c".to_string(), "nope".to_string()]);
    }

    #[test]
    fn test_self_reference() {
        let spec = chain().with_node("c", Operation::mul("c", "x"));
        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::SELF_REF));
    }

    #[test]
    fn test_cycle_detection() {
        let spec = GraphSpec::new("loop")
            .with_input(InputSpec::new("x"))
            .with_node("a", Operation::add("x", "c"))
            .with_node("b", Operation::sin("a"))
            .with_node("c", Operation::pow("b", 2.0));

        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::CYCLE));
        assert_eq!(err.nodes, vec!["a", "c", "b", "a"]);
        assert!(err.message.contains("a -> c -> b -> a"));
    }

    #[test]
    fn test_validate_deep_chain() {
        const DEPTH: usize = 10_000;

        // Declared last-first so the sort has to walk the whole chain at once.
        let mut spec = GraphSpec::new("deep").with_input(InputSpec::new("x"));
        for i in (1..DEPTH).rev() {
            spec = spec.with_node(format!("n{i}"), Operation::sin(format!("n{}", i - 1)));
        }
        spec = spec.with_node("n0", Operation::sin("x"));

        let order = spec.validate().unwrap();
        assert_eq!(order.len(), DEPTH);
        assert_eq!(order[0], "n0");
        assert_eq!(order[DEPTH - 1], format!("n{}", DEPTH - 1));
    }

    #[test]
    fn test_cycle_through_deep_chain() {
        let mut spec = GraphSpec::new("deep_loop").with_input(InputSpec::new("x"));
        for i in 1..5_000 {
            spec = spec.with_node(format!("n{i}"), Operation::sin(format!("n{}", i - 1)));
        }
        spec = spec.with_node("n0", Operation::add("x", "n4999"));

        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::CYCLE));
        assert_eq!(err.nodes.len(), 5_001);
        assert_eq!(err.nodes.first(), err.nodes.last());
    }

    #[test]
    fn test_unknown_output() {
        let spec = chain().with_output("missing");
        let err = spec.validate().unwrap_err();
        assert_eq!(err.code(), Some(codes::NO_OUTPUT));
    }

    #[test]
    fn test_output_may_be_an_input() {
        let spec = chain().with_output("x");
        assert!(spec.validate().is_ok());
    }
}
