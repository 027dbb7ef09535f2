//! Polyhedron descriptors: vertex form (`VertexRep`) and halfspace form (`HalfspaceRep`).
//!
//! Purpose
//! - Immutable value objects mirroring the solver's `.poi` and `.ieq` files.
//! - All shape checks and int→rational promotion happen once, in `new`.
//!
//! Assumptions and conventions
//! - Halfspace rows are `[α_1 … α_M, β]` meaning `α·x <= β` (inequalities)
//!   or `α·x = β` (equalities). There is no `>=` form in memory.
//! - `dimension()` is the common coordinate count of the non-empty fields,
//!   `None` if all fields are empty.
//! - A valid point is a single row; it takes part in the dimension check and
//!   in promotion like any other exact field.
//! - Bounds and elimination order are integer-only (`IntMatrix`) and never
//!   promoted.

mod halfspace;
mod vertex;

pub use halfspace::HalfspaceRep;
pub use vertex::VertexRep;

use crate::exact::{ExactMatrix, ShapeError};

/// Coordinate count per non-empty field; all must agree.
fn common_dimension(fields: &[(&'static str, usize)]) -> Result<Option<usize>, ShapeError> {
    let Some(&(_, expected)) = fields.first() else {
        return Ok(None);
    };
    for &(field, actual) in fields {
        if actual != expected {
            return Err(ShapeError::ColumnMismatch {
                field,
                expected,
                actual,
            });
        }
    }
    Ok(Some(expected))
}

fn check_single_row(field: &'static str, m: &ExactMatrix) -> Result<(), ShapeError> {
    if m.rows() > 1 {
        return Err(ShapeError::MultipleValidPoints {
            field,
            rows: m.rows(),
        });
    }
    Ok(())
}

/// Single-row fields (valid point, bounds, elimination order) carry at least
/// one entry per row.
fn check_row_width(field: &'static str, rows: usize, cols: usize) -> Result<(), ShapeError> {
    if rows > 0 && cols == 0 {
        return Err(ShapeError::EmptyRow { field });
    }
    Ok(())
}

/// Promote every field if any one of them is rational.
fn normalize<const N: usize>(fields: [ExactMatrix; N]) -> [ExactMatrix; N] {
    if fields.iter().any(ExactMatrix::is_rational) {
        fields.map(ExactMatrix::promote)
    } else {
        fields
    }
}
