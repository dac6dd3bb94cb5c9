//! Operation nodes, the building blocks of a computational graph.

use std::rc::Rc;

use tracing::trace;

use crate::cache::Cache;
use crate::node::{Dependencies, Node};

/// Node applying `op` to the values of two operand nodes `x` and `y`.
///
/// The result is cached until one of the operands changes.
pub struct Binary<F: Fn(f32, f32) -> f32> {
    x: Rc<dyn Node<Output = f32>>,
    y: Rc<dyn Node<Output = f32>>,
    op: F,
    cached: Cache<f32>,
    dep: Dependencies<f32>,
}

impl<F: Fn(f32, f32) -> f32 + 'static> Binary<F> {
    /// Creates the node and registers it as a dependent of both operands.
    pub fn new(x: Rc<dyn Node<Output = f32>>, y: Rc<dyn Node<Output = f32>>, op: F) -> Rc<Self> {
        let node = Rc::new(Self {
            x: Rc::clone(&x),
            y: Rc::clone(&y),
            op,
            cached: Cache::new(),
            dep: Dependencies::default(),
        });
        x.add_dependent(node.clone());
        y.add_dependent(node.clone());
        node
    }
}

impl<F: Fn(f32, f32) -> f32> Binary<F> {
    /// Whether the node currently holds a cached value.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached.is_valid()
    }
}

impl<F: Fn(f32, f32) -> f32> Node for Binary<F> {
    type Output = f32;

    fn compute(&self) -> f32 {
        self.cached.get_or_else(|| {
            let value = (self.op)(self.x.compute(), self.y.compute());
            trace!(value, "Binary node recomputed");
            value
        })
    }

    fn invalidate(&self) {
        // An empty cache means nothing downstream was computed from it.
        if !self.cached.is_valid() {
            return;
        }
        self.cached.invalidate();
        self.dep.invalidate();
    }

    fn add_dependent(&self, n: Rc<dyn Node<Output = f32>>) {
        self.dep.add(n);
    }
}

/// Node applying `op` to the value of a single operand node `x`.
///
/// The result is cached until the operand changes.
pub struct Unary<F: Fn(f32) -> f32> {
    x: Rc<dyn Node<Output = f32>>,
    op: F,
    cached: Cache<f32>,
    dep: Dependencies<f32>,
}

impl<F: Fn(f32) -> f32 + 'static> Unary<F> {
    /// Creates the node and registers it as a dependent of its operand.
    pub fn new(x: Rc<dyn Node<Output = f32>>, op: F) -> Rc<Self> {
        let node = Rc::new(Self {
            x: Rc::clone(&x),
            op,
            cached: Cache::new(),
            dep: Dependencies::default(),
        });
        x.add_dependent(node.clone());
        node
    }
}

impl<F: Fn(f32) -> f32> Unary<F> {
    /// Whether the node currently holds a cached value.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached.is_valid()
    }
}

impl<F: Fn(f32) -> f32> Node for Unary<F> {
    type Output = f32;

    fn compute(&self) -> f32 {
        self.cached.get_or_else(|| {
            let value = (self.op)(self.x.compute());
            trace!(value, "Unary node recomputed");
            value
        })
    }

    fn invalidate(&self) {
        if !self.cached.is_valid() {
            return;
        }
        self.cached.invalidate();
        self.dep.invalidate();
    }

    fn add_dependent(&self, n: Rc<dyn Node<Output = f32>>) {
        self.dep.add(n);
    }
}
