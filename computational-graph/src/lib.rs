//! # Computational Graph
//!
//! Directed acyclic graphs of `f32` operations with caching inside the nodes.
//!
//! The graph has no common storage: it is made of individual nodes linked for
//! computation (operation nodes own their operands) and for cache
//! invalidation (every node keeps weak links to the nodes depending on it).
//!
//! - **Lazy evaluation**: values are computed on request and cached per node
//! - **Targeted invalidation**: setting an input clears only downstream caches
//! - **Declarative graphs**: [`graph::GraphSpec`] describes a graph in JSON,
//!   validated and built into a name-addressable [`graph::Graph`]
//!
//! ## Example
//!
//! ```rust
//! use computational_graph::*;
//!
//! // x1, x2, x3 are input nodes of the computational graph:
//! let x1 = create_input("x1");
//! let x2 = create_input("x2");
//! let x3 = create_input("x3");
//! // graph variable is the output node of the graph:
//! let graph = add(
//!     x1.clone(),
//!     mul(x2.clone(), sin(add(x2.clone(), pow_f32(x3.clone(), 3f32)))),
//! );
//! x1.set(1f32);
//! x2.set(2f32);
//! x3.set(3f32);
//! assert_eq!(round_to(graph.compute(), 5), -0.32727);
//!
//! x1.set(2f32);
//! x2.set(3f32);
//! x3.set(4f32);
//! assert_eq!(round_to(graph.compute(), 5), -0.56656);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cache;
pub mod errors;
pub mod graph;
pub mod node;
pub mod observability;
pub mod operations;
pub mod utils;

pub use node::{Input, Node};
pub use utils::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::Cache;
    pub use crate::errors::{
        CycleDetectedError, ErrorInfo, GraphError, GraphValidationError, UnknownNodeError,
    };
    pub use crate::graph::{Graph, GraphBuilder, GraphSpec, InputSpec, NodeSpec, Operation};
    pub use crate::node::{Input, Node};
    pub use crate::observability::{init_tracing, LoggingConfig};
    pub use crate::operations::{Binary, Unary};
    pub use crate::utils::{add, create_input, mul, pow_f32, round_to, sin};
}
