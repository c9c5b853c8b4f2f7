//! Numerical helpers: least squares and first-occurrence argmax.

pub mod argmax;
pub mod ols;

pub use argmax::*;
pub use ols::*;
