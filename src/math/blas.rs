//! Slice-level arithmetic the loss layers are written against.
//!
//! All routines expect equal-length slices; callers validate shapes first.

use crate::math::element::Element;

/// y = a - b
pub fn sub<T: Element>(a: &[T], b: &[T], y: &mut [T]) {
    debug_assert!(a.len() == b.len() && a.len() == y.len());
    for ((y_i, &a_i), &b_i) in y.iter_mut().zip(a).zip(b) {
        *y_i = a_i - b_i;
    }
}

/// y = a ⊙ b
pub fn mul<T: Element>(a: &[T], b: &[T], y: &mut [T]) {
    debug_assert!(a.len() == b.len() && a.len() == y.len());
    for ((y_i, &a_i), &b_i) in y.iter_mut().zip(a).zip(b) {
        *y_i = a_i * b_i;
    }
}

pub fn dot<T: Element>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (&a_i, &b_i)| acc + a_i * b_i)
}

/// y = alpha·x + beta·y
///
/// With `beta == 0` the previous contents of `y` are never read, NaNs included.
pub fn axpby<T: Element>(alpha: T, x: &[T], beta: T, y: &mut [T]) {
    debug_assert_eq!(x.len(), y.len());
    if beta == T::zero() {
        for (y_i, &x_i) in y.iter_mut().zip(x) {
            *y_i = alpha * x_i;
        }
    } else {
        for (y_i, &x_i) in y.iter_mut().zip(x) {
            *y_i = alpha * x_i + beta * *y_i;
        }
    }
}
