//! Exact values and matrices (arbitrary-precision integers and rationals).
//!
//! Purpose
//! - Hold solver data without floating-point rounding. Every matrix is
//!   homogeneous: all entries are integers or all entries are rationals.
//! - Promotion (integer → rational) is an explicit, lossless step. Mixed
//!   descriptors call it once at construction instead of relying on
//!   implicit coercion.
//!
//! Conventions
//! - Matrices are row-major; rows are the outer sequence.
//! - A matrix with zero rows reports zero columns; its column count carries
//!   no meaning until a sibling field fixes the dimension.
//! - Equality between an integer and a rational matrix compares values, so
//!   `[[1, 2]]` equals `[[1/1, 4/2]]`.

mod matrix;
mod value;

pub use matrix::{ExactMatrix, IntMatrix, Matrix, RationalMatrix, ShapeError};
pub use value::{parse_exact, ratio, Exact};
