use crate::exact::{ExactMatrix, ShapeError};

use super::{check_row_width, check_single_row, common_dimension, normalize};

/// Vertex/ray representation (`.poi`).
///
/// Invariants:
/// - `vertices`, `rays` and `valid_point` agree on their column count when
///   non-empty.
/// - Either every field is rational or none is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexRep {
    vertices: ExactMatrix,
    rays: ExactMatrix,
    valid_point: ExactMatrix,
    dim: Option<usize>,
}

impl VertexRep {
    /// Omitted fields default to empty matrices.
    pub fn new(
        vertices: Option<ExactMatrix>,
        rays: Option<ExactMatrix>,
        valid_point: Option<ExactMatrix>,
    ) -> Result<Self, ShapeError> {
        let vertices = vertices.unwrap_or_default();
        let rays = rays.unwrap_or_default();
        let valid_point = valid_point.unwrap_or_default();
        check_single_row("valid_point", &valid_point)?;
        check_row_width("valid_point", valid_point.rows(), valid_point.cols())?;

        let widths: Vec<_> = [
            ("vertices", &vertices),
            ("rays", &rays),
            ("valid_point", &valid_point),
        ]
        .into_iter()
        .filter(|(_, m)| !m.is_empty())
        .map(|(name, m)| (name, m.cols()))
        .collect();
        let dim = common_dimension(&widths)?;

        let [vertices, rays, valid_point] = normalize([vertices, rays, valid_point]);
        Ok(Self {
            vertices,
            rays,
            valid_point,
            dim,
        })
    }

    #[inline]
    pub fn from_vertices(vertices: ExactMatrix) -> Result<Self, ShapeError> {
        Self::new(Some(vertices), None, None)
    }

    #[inline]
    pub fn vertices(&self) -> &ExactMatrix {
        &self.vertices
    }
    #[inline]
    pub fn rays(&self) -> &ExactMatrix {
        &self.rays
    }
    #[inline]
    pub fn valid_point(&self) -> &ExactMatrix {
        &self.valid_point
    }
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dim
    }

    pub fn is_rational(&self) -> bool {
        self.vertices.is_rational() || self.rays.is_rational() || self.valid_point.is_rational()
    }

    /// Same polyhedron with every field re-tagged rational.
    pub fn into_rational(self) -> Self {
        Self {
            vertices: self.vertices.promote(),
            rays: self.rays.promote(),
            valid_point: self.valid_point.promote(),
            dim: self.dim,
        }
    }
}
