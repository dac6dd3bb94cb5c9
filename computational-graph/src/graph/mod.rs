//! Name-addressable graphs.
//!
//! This module provides:
//! - Declarative graph specifications ([`GraphSpec`]), loadable from JSON
//! - A builder with validation ([`GraphBuilder`])
//! - [`Graph`], a built graph whose inputs and nodes are reached by name

mod builder;
mod integration_tests;
mod spec;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::errors::{GraphError, UnknownNodeError};
use crate::node::{Input, Node};
use crate::observability::EvalTimer;

pub use builder::GraphBuilder;
pub use spec::{GraphSpec, InputSpec, NodeSpec, Operation};

/// A built computational graph.
///
/// Nodes keep their own caches, so computing the output twice without
/// changing an input does no work the second time.
pub struct Graph {
    name: String,
    inputs: HashMap<String, Rc<Input>>,
    nodes: HashMap<String, Rc<dyn Node<Output = f32>>>,
    /// Insertion order; every node comes after its operands.
    order: Vec<String>,
    output: String,
    output_node: Rc<dyn Node<Output = f32>>,
}

impl Graph {
    /// Returns the graph name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of nodes, inputs included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the input names in declaration order.
    #[must_use]
    pub fn input_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.inputs.contains_key(*name))
            .map(String::as_str)
            .collect()
    }

    /// Returns every node name, operands before the nodes that use them.
    #[must_use]
    pub fn execution_order(&self) -> &[String] {
        &self.order
    }

    /// Returns the name of the output node.
    #[must_use]
    pub fn output_name(&self) -> &str {
        &self.output
    }

    /// Whether a node or input with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Returns the input named `name`.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<Rc<Input>> {
        self.inputs.get(name).cloned()
    }

    /// Returns the node named `name`, inputs included.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<Rc<dyn Node<Output = f32>>> {
        self.nodes.get(name).cloned()
    }

    /// Sets the value of an input.
    pub fn set(&self, name: &str, value: f32) -> Result<(), GraphError> {
        self.resolve_input(name)?.set(value);
        Ok(())
    }

    /// Sets several inputs.
    ///
    /// Every name is checked before any value is stored: on error, no input
    /// has changed.
    pub fn set_many<I, K>(&self, values: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = (K, f32)>,
        K: AsRef<str>,
    {
        let resolved = values
            .into_iter()
            .map(|(name, value)| Ok((self.resolve_input(name.as_ref())?, value)))
            .collect::<Result<Vec<_>, GraphError>>()?;

        for (input, value) in resolved {
            input.set(value);
        }
        Ok(())
    }

    /// Computes the value of the output node.
    pub fn compute(&self) -> f32 {
        let timer = EvalTimer::start(&self.name, &self.output);
        let value = self.output_node.compute();
        timer.finish(value);
        value
    }

    /// Computes the value of any node by name.
    pub fn compute_node(&self, name: &str) -> Result<f32, GraphError> {
        self.nodes
            .get(name)
            .map(|node| node.compute())
            .ok_or_else(|| UnknownNodeError::new(name).into())
    }

    /// Sets the given inputs, then computes the output.
    pub fn evaluate<I, K>(&self, values: I) -> Result<f32, GraphError>
    where
        I: IntoIterator<Item = (K, f32)>,
        K: AsRef<str>,
    {
        self.set_many(values)?;
        Ok(self.compute())
    }

    /// Returns the current value of every node, computing where needed.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, f32> {
        self.order
            .iter()
            .filter_map(|name| {
                self.nodes
                    .get(name)
                    .map(|node| (name.clone(), node.compute()))
            })
            .collect()
    }

    fn resolve_input(&self, name: &str) -> Result<&Rc<Input>, GraphError> {
        match self.inputs.get(name) {
            Some(input) => Ok(input),
            None if self.nodes.contains_key(name) => Err(GraphError::NotAnInput(name.to_string())),
            None => Err(UnknownNodeError::new(name).into()),
        }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
