//! Graph builder with validation.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::spec::{
    duplicate_error, missing_operand_error, self_reference_error, unknown_output_error, NodeSpec,
    Operation,
};
use super::Graph;
use crate::errors::{codes, ErrorInfo, GraphValidationError};
use crate::node::{Input, Node};
use crate::utils::{add, create_input, mul, pow_f32, sin};

/// Builder for creating validated graphs.
///
/// Operands must exist before the node that uses them is added, so a builder
/// can never produce a cycle.
pub struct GraphBuilder {
    /// The graph name.
    name: String,
    /// Input nodes by name.
    inputs: HashMap<String, Rc<Input>>,
    /// Every node by name, inputs included.
    nodes: HashMap<String, Rc<dyn Node<Output = f32>>>,
    /// Insertion order.
    order: Vec<String>,
    /// Requested output node.
    output: Option<String>,
}

impl GraphBuilder {
    /// Creates a new graph builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: HashMap::new(),
            nodes: HashMap::new(),
            order: Vec::new(),
            output: None,
        }
    }

    /// Adds an input with value `0.0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub fn input(mut self, name: impl Into<String>) -> Result<Self, GraphValidationError> {
        self.add_input(name, 0.0)?;
        Ok(self)
    }

    /// Adds an input with an initial value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub fn input_with_value(
        mut self,
        name: impl Into<String>,
        value: f32,
    ) -> Result<Self, GraphValidationError> {
        self.add_input(name, value)?;
        Ok(self)
    }

    /// Adds an operation node.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or an operand is
    /// unknown.
    pub fn node(
        mut self,
        name: impl Into<String>,
        operation: Operation,
    ) -> Result<Self, GraphValidationError> {
        self.add_node_spec(NodeSpec::new(name, operation))?;
        Ok(self)
    }

    /// Selects the output node. Checked when building.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// Adds an input in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub fn add_input(
        &mut self,
        name: impl Into<String>,
        value: f32,
    ) -> Result<(), GraphValidationError> {
        let name = name.into();
        self.check_new_name(&name)?;

        let input = create_input(name.clone());
        input.set(value);
        self.nodes.insert(name.clone(), input.clone());
        self.inputs.insert(name.clone(), input);
        self.order.push(name);
        Ok(())
    }

    /// Adds an operation node in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or an operand is
    /// unknown.
    pub fn add_node_spec(&mut self, spec: NodeSpec) -> Result<(), GraphValidationError> {
        self.check_new_name(&spec.name)?;

        for operand in spec.operation.operands() {
            if operand == spec.name {
                return Err(self_reference_error(&spec.name));
            }
            if !self.nodes.contains_key(operand) {
                let info = ErrorInfo::new(
                    codes::MISSING_NODE,
                    format!("Operand '{operand}' not found"),
                )
                .with_fix_hint("Add operands before the nodes that use them.");
                return Err(missing_operand_error(&spec.name, operand).with_error_info(info));
            }
        }

        let node = self.instantiate(&spec.operation);
        self.nodes.insert(spec.name.clone(), node);
        self.order.push(spec.name);
        Ok(())
    }

    /// Builds the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder is empty or the output is unknown.
    pub fn build(self) -> Result<Graph, GraphValidationError> {
        let Some(last) = self.order.last() else {
            return Err(GraphValidationError::new(format!("Graph '{}' is empty", self.name))
                .with_error_info(
                    ErrorInfo::new(codes::EMPTY, "Cannot build an empty graph").with_default_hint(),
                ));
        };

        let output = self.output.clone().unwrap_or_else(|| last.clone());
        let Some(output_node) = self.nodes.get(&output).cloned() else {
            return Err(unknown_output_error(&output));
        };

        Ok(Graph {
            name: self.name,
            inputs: self.inputs,
            nodes: self.nodes,
            order: self.order,
            output,
            output_node,
        })
    }

    /// Returns the graph name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of nodes added so far, inputs included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    fn check_new_name(&self, name: &str) -> Result<(), GraphValidationError> {
        check_name(name)?;
        if self.nodes.contains_key(name) {
            return Err(duplicate_error(name));
        }
        Ok(())
    }

    /// Creates the node for `operation`. Operands must already be present.
    fn instantiate(&self, operation: &Operation) -> Rc<dyn Node<Output = f32>> {
        match operation {
            Operation::Add { lhs, rhs } => add(self.operand(lhs), self.operand(rhs)),
            Operation::Mul { lhs, rhs } => mul(self.operand(lhs), self.operand(rhs)),
            Operation::Sin { arg } => sin(self.operand(arg)),
            Operation::Pow { base, exponent } => pow_f32(self.operand(base), *exponent),
        }
    }

    fn operand(&self, name: &str) -> Rc<dyn Node<Output = f32>> {
        Rc::clone(&self.nodes[name])
    }
}

impl fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Checks that `name` can identify a node.
///
/// Names must be non-empty and contain neither whitespace nor `->`, which is
/// used to render cycle paths.
pub(crate) fn check_name(name: &str) -> Result<(), GraphValidationError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) || name.contains("->") {
        return Err(GraphValidationError::new(format!("Invalid node name '{name}'"))
            .with_nodes(vec![name.to_string()])
            .with_error_info(
                ErrorInfo::new(codes::BAD_NAME, format!("Invalid name '{name}'"))
                    .with_default_hint(),
            ));
    }
    Ok(())
}
