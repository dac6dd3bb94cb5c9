//! Basic types to create a computational graph with caching.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

/// A node of a computational graph.
///
/// A node returns a (possibly cached) value, accepts invalidation requests and
/// keeps links to the nodes whose values depend on its own, so that their
/// caches can be cleared once this node changes.
///
/// The trait is object-safe: graphs are assembled from
/// `Rc<dyn Node<Output = T>>` handles.
///
/// # Example
///
/// ```
/// use computational_graph::*;
///
/// let x = create_input("x");
/// let y = create_input("y");
/// let sum = add(x.clone(), y.clone());
///
/// x.set(1.0);
/// y.set(2.0);
/// assert_eq!(sum.compute(), 3.0);
///
/// y.set(-1.0);
/// assert_eq!(sum.compute(), 0.0);
/// ```
pub trait Node {
    /// Type of the value produced by the node.
    type Output;

    /// Returns the value of the node, either from its cache or by running a
    /// computation of unknown cost.
    fn compute(&self) -> Self::Output;

    /// Invalidates the cache of this node and of every node depending on it.
    fn invalidate(&self);

    /// Registers `n` as a node whose value depends on this one.
    fn add_dependent(&self, n: Rc<dyn Node<Output = Self::Output>>);
}

/// Links to the nodes that must be invalidated when the owner changes.
///
/// Links are weak: operand nodes never keep their dependents alive, and the
/// strong operand references held by operation nodes can't form a cycle.
pub(crate) struct Dependencies<T> {
    vec: RefCell<Vec<Weak<dyn Node<Output = T>>>>,
}

impl<T> Default for Dependencies<T> {
    fn default() -> Self {
        Self {
            vec: RefCell::new(Vec::new()),
        }
    }
}

impl<T> Dependencies<T> {
    /// Stores a weak link to `n`, dropping links to dependents that are gone.
    pub(crate) fn add(&self, n: Rc<dyn Node<Output = T>>) {
        let mut vec = self.vec.borrow_mut();
        vec.retain(|d| d.strong_count() > 0);
        vec.push(Rc::downgrade(&n));
    }

    /// Invalidates every live dependent and forgets the dropped ones.
    pub(crate) fn invalidate(&self) {
        // Collect first: a dependent's invalidation must not observe this
        // RefCell borrowed.
        let live: Vec<Rc<dyn Node<Output = T>>> = {
            let mut vec = self.vec.borrow_mut();
            vec.retain(|d| d.strong_count() > 0);
            vec.iter().filter_map(|d| d.upgrade()).collect()
        };
        for d in live {
            d.invalidate();
        }
    }

    /// Number of dependents that are still alive.
    pub(crate) fn len(&self) -> usize {
        self.vec
            .borrow()
            .iter()
            .filter(|d| d.strong_count() > 0)
            .count()
    }
}

/// A named `f32` leaf of the graph.
///
/// Setting a new value invalidates the caches of all dependent nodes. The
/// input itself has no cache: [`Node::compute`] returns the stored value.
pub struct Input {
    name: String,
    value: Cell<f32>,
    dep: Dependencies<f32>,
}

impl Input {
    /// Creates an input with value `0.0`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Cell::new(0.0),
            dep: Dependencies::default(),
        }
    }

    /// Returns the input name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value.get()
    }

    /// Number of live nodes reading this input directly.
    #[must_use]
    pub fn dependent_count(&self) -> usize {
        self.dep.len()
    }

    /// Stores `x` and invalidates the caches of the dependent nodes.
    pub fn set(&self, x: f32) {
        debug!(input = %self.name, value = x, "Input updated");
        self.invalidate();
        self.value.set(x);
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .field("dependents", &self.dep.len())
            .finish()
    }
}

impl Node for Input {
    type Output = f32;

    fn compute(&self) -> f32 {
        self.value.get()
    }

    /// Inputs hold no cache, only the dependents are invalidated.
    fn invalidate(&self) {
        self.dep.invalidate();
    }

    fn add_dependent(&self, n: Rc<dyn Node<Output = f32>>) {
        self.dep.add(n);
    }
}
