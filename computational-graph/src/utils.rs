//! Functions to assemble a computational graph from common math operations.

use std::rc::Rc;

use crate::node::{Input, Node};
use crate::operations::{Binary, Unary};

/// Creates an input node with the given name.
pub fn create_input(name: impl Into<String>) -> Rc<Input> {
    Rc::new(Input::new(name))
}

/// Creates a node adding the values of `x` and `y`.
pub fn add(
    x: Rc<dyn Node<Output = f32>>,
    y: Rc<dyn Node<Output = f32>>,
) -> Rc<dyn Node<Output = f32>> {
    Binary::new(x, y, |x, y| x + y)
}

/// Creates a node multiplying the values of `x` and `y`.
pub fn mul(
    x: Rc<dyn Node<Output = f32>>,
    y: Rc<dyn Node<Output = f32>>,
) -> Rc<dyn Node<Output = f32>> {
    Binary::new(x, y, |x, y| x * y)
}

/// Creates a node computing the sine of the value of `x`.
pub fn sin(x: Rc<dyn Node<Output = f32>>) -> Rc<dyn Node<Output = f32>> {
    Unary::new(x, f32::sin)
}

/// Creates a node raising the value of `x` to the power `e`.
pub fn pow_f32(x: Rc<dyn Node<Output = f32>>, e: f32) -> Rc<dyn Node<Output = f32>> {
    Unary::new(x, move |x| x.powf(e))
}

/// Rounds `x` to `digits` decimal places.
///
/// Returns `x` unchanged when scaling by `10^digits` overflows `f32`; such
/// values carry no decimals at that precision anyway.
#[must_use]
pub fn round_to(x: f32, digits: u32) -> f32 {
    let m = 10f32.powi(i32::try_from(digits).unwrap_or(i32::MAX));
    let scaled = x * m;
    if !m.is_finite() || !scaled.is_finite() {
        return x;
    }
    scaled.round() / m
}
