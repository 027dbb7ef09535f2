use crate::exact::{ExactMatrix, IntMatrix, ShapeError};

use super::{check_row_width, check_single_row, common_dimension, normalize};

/// Halfspace representation (`.ieq`).
///
/// Invariants:
/// - In/equality rows are `[α_1 … α_M, β]`; bounds, elimination order and
///   the valid point have `M` columns. All non-empty fields agree on `M`.
/// - In/equalities and the valid point are all rational or all integer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HalfspaceRep {
    inequalities: ExactMatrix,
    equalities: ExactMatrix,
    lower_bounds: IntMatrix,
    upper_bounds: IntMatrix,
    elimination_order: IntMatrix,
    valid_point: ExactMatrix,
    dim: Option<usize>,
}

impl HalfspaceRep {
    /// Omitted fields default to empty matrices.
    pub fn new(
        inequalities: Option<ExactMatrix>,
        equalities: Option<ExactMatrix>,
        lower_bounds: Option<IntMatrix>,
        upper_bounds: Option<IntMatrix>,
        elimination_order: Option<IntMatrix>,
        valid_point: Option<ExactMatrix>,
    ) -> Result<Self, ShapeError> {
        let inequalities = inequalities.unwrap_or_default();
        let equalities = equalities.unwrap_or_default();
        let lower_bounds = lower_bounds.unwrap_or_default();
        let upper_bounds = upper_bounds.unwrap_or_default();
        let elimination_order = elimination_order.unwrap_or_default();
        let valid_point = valid_point.unwrap_or_default();
        check_single_row("valid_point", &valid_point)?;
        check_row_width("valid_point", valid_point.rows(), valid_point.cols())?;
        for (field, m) in [
            ("lower_bounds", &lower_bounds),
            ("upper_bounds", &upper_bounds),
            ("elimination_order", &elimination_order),
        ] {
            check_row_width(field, m.rows(), m.cols())?;
        }

        let mut widths = Vec::with_capacity(6);
        for (field, m) in [("inequalities", &inequalities), ("equalities", &equalities)] {
            if m.is_empty() {
                continue;
            }
            let coords = m
                .cols()
                .checked_sub(1)
                .ok_or(ShapeError::MissingCoefficients { field })?;
            widths.push((field, coords));
        }
        for (field, m) in [
            ("lower_bounds", &lower_bounds),
            ("upper_bounds", &upper_bounds),
            ("elimination_order", &elimination_order),
        ] {
            if !m.is_empty() {
                widths.push((field, m.cols()));
            }
        }
        if !valid_point.is_empty() {
            widths.push(("valid_point", valid_point.cols()));
        }
        let dim = common_dimension(&widths)?;

        let [inequalities, equalities, valid_point] =
            normalize([inequalities, equalities, valid_point]);
        Ok(Self {
            inequalities,
            equalities,
            lower_bounds,
            upper_bounds,
            elimination_order,
            valid_point,
            dim,
        })
    }

    /// Only in/equalities; other fields empty.
    pub fn from_constraints(
        inequalities: ExactMatrix,
        equalities: ExactMatrix,
    ) -> Result<Self, ShapeError> {
        Self::new(Some(inequalities), Some(equalities), None, None, None, None)
    }

    #[inline]
    pub fn inequalities(&self) -> &ExactMatrix {
        &self.inequalities
    }
    #[inline]
    pub fn equalities(&self) -> &ExactMatrix {
        &self.equalities
    }
    #[inline]
    pub fn lower_bounds(&self) -> &IntMatrix {
        &self.lower_bounds
    }
    #[inline]
    pub fn upper_bounds(&self) -> &IntMatrix {
        &self.upper_bounds
    }
    #[inline]
    pub fn elimination_order(&self) -> &IntMatrix {
        &self.elimination_order
    }
    #[inline]
    pub fn valid_point(&self) -> &ExactMatrix {
        &self.valid_point
    }
    /// `M`, the number of variables.
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dim
    }

    pub fn is_rational(&self) -> bool {
        self.inequalities.is_rational()
            || self.equalities.is_rational()
            || self.valid_point.is_rational()
    }

    pub fn into_rational(self) -> Self {
        Self {
            inequalities: self.inequalities.promote(),
            equalities: self.equalities.promote(),
            valid_point: self.valid_point.promote(),
            ..self
        }
    }
}
