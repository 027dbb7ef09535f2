//! Rectangular row-major matrices and the integer/rational tagged variant.

use num_bigint::BigInt;
use num_rational::BigRational;
use thiserror::Error;

use super::value::Exact;

/// Shape violations raised when building matrices or descriptors.
///
/// Raised at construction only; conversion never re-checks shapes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("row {row} has {actual} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("field `{field}` has {actual} coordinate columns, expected {expected}")]
    ColumnMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("field `{field}` has rows but no right-hand-side column")]
    MissingCoefficients { field: &'static str },
    #[error("field `{field}` must hold at most one point, got {rows} rows")]
    MultipleValidPoints { field: &'static str, rows: usize },
    #[error("field `{field}` has a row with no entries")]
    EmptyRow { field: &'static str },
}

/// Dense row-major matrix. Zero rows implies zero columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

pub type IntMatrix = Matrix<BigInt>;
pub type RationalMatrix = Matrix<BigRational>;

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Matrix<T> {
    #[inline]
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: Vec::new(),
        }
    }

    /// Build from rows; fails with `RaggedRows` if lengths differ.
    pub fn from_rows<I, R, V>(rows: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<T>,
    {
        let mut out = Self::empty();
        for row in rows {
            out.push_row(row.into_iter().map(Into::into).collect())?;
        }
        Ok(out)
    }

    /// Single-row matrix (e.g. a valid point or a bound vector).
    pub fn row_vector<V: Into<T>>(row: impl IntoIterator<Item = V>) -> Self {
        let data: Vec<T> = row.into_iter().map(Into::into).collect();
        Self {
            rows: 1,
            cols: data.len(),
            data,
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<T>) -> Result<(), ShapeError> {
        if self.rows == 0 {
            self.cols = row.len();
        } else if row.len() != self.cols {
            return Err(ShapeError::RaggedRows {
                row: self.rows,
                expected: self.cols,
                actual: row.len(),
            });
        }
        self.data.extend(row);
        self.rows += 1;
        Ok(())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row `i` as a slice. Panics if `i >= rows()`.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }
}

/// Matrix tagged with its value kind. Equality compares values, not tags.
#[derive(Clone, Debug)]
pub enum ExactMatrix {
    Int(IntMatrix),
    Rational(RationalMatrix),
}

impl Default for ExactMatrix {
    fn default() -> Self {
        ExactMatrix::Int(Matrix::empty())
    }
}

impl ExactMatrix {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Integer matrix from rows of anything convertible to `BigInt`.
    pub fn int<I, R, V>(rows: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<BigInt>,
    {
        Matrix::from_rows(rows).map(ExactMatrix::Int)
    }

    /// Rational matrix from rows of anything convertible to `BigRational`.
    pub fn rational<I, R, V>(rows: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<BigRational>,
    {
        Matrix::from_rows(rows).map(ExactMatrix::Rational)
    }

    /// Build from parsed entries: integer if every entry is, rational otherwise.
    pub fn from_exact_rows(rows: Vec<Vec<Exact>>) -> Result<Self, ShapeError> {
        let lift = |row: Vec<BigInt>| -> Vec<BigRational> {
            row.into_iter().map(BigRational::from_integer).collect()
        };
        let mut ints: Vec<Vec<BigInt>> = Vec::with_capacity(rows.len());
        let mut rows = rows.into_iter();
        while let Some(row) = rows.next() {
            let mut int_row = Vec::with_capacity(row.len());
            let mut entries = row.into_iter();
            while let Some(value) = entries.next() {
                match value {
                    Exact::Int(n) => int_row.push(n),
                    Exact::Rational(r) => {
                        // first rational entry: promote what was read, then the rest
                        let mut current = lift(int_row);
                        current.push(r);
                        current.extend(entries.map(Exact::into_rational));
                        let rest = rows.map(|row| {
                            row.into_iter().map(Exact::into_rational).collect::<Vec<_>>()
                        });
                        let all = ints.into_iter().map(lift).chain(Some(current)).chain(rest);
                        return Matrix::from_rows(all).map(ExactMatrix::Rational);
                    }
                }
            }
            ints.push(int_row);
        }
        Matrix::from_rows(ints).map(ExactMatrix::Int)
    }

    pub fn rows(&self) -> usize {
        match self {
            ExactMatrix::Int(m) => m.rows(),
            ExactMatrix::Rational(m) => m.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            ExactMatrix::Int(m) => m.cols(),
            ExactMatrix::Rational(m) => m.cols(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    #[inline]
    pub fn is_rational(&self) -> bool {
        matches!(self, ExactMatrix::Rational(_))
    }

    /// Element-wise lossless copy as rationals.
    pub fn to_rational(&self) -> RationalMatrix {
        match self {
            ExactMatrix::Int(m) => m.map(|n| BigRational::from_integer(n.clone())),
            ExactMatrix::Rational(m) => m.clone(),
        }
    }

    /// Re-tag as rational; a no-op on rational matrices.
    pub fn promote(self) -> Self {
        match self {
            ExactMatrix::Int(_) => ExactMatrix::Rational(self.to_rational()),
            rational => rational,
        }
    }

    pub fn entry(&self, row: usize, col: usize) -> Option<Exact> {
        match self {
            ExactMatrix::Int(m) => m.get(row, col).cloned().map(Exact::Int),
            ExactMatrix::Rational(m) => m.get(row, col).cloned().map(Exact::Rational),
        }
    }

    /// Row `i` as exact entries. Panics if `i >= rows()`.
    pub fn row_values(&self, i: usize) -> Vec<Exact> {
        match self {
            ExactMatrix::Int(m) => m.row(i).iter().cloned().map(Exact::Int).collect(),
            ExactMatrix::Rational(m) => m.row(i).iter().cloned().map(Exact::Rational).collect(),
        }
    }
}

impl PartialEq for ExactMatrix {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExactMatrix::Int(a), ExactMatrix::Int(b)) => a == b,
            (ExactMatrix::Rational(a), ExactMatrix::Rational(b)) => a == b,
            _ => self.to_rational() == other.to_rational(),
        }
    }
}

impl Eq for ExactMatrix {}

impl From<IntMatrix> for ExactMatrix {
    fn from(m: IntMatrix) -> Self {
        ExactMatrix::Int(m)
    }
}

impl From<RationalMatrix> for ExactMatrix {
    fn from(m: RationalMatrix) -> Self {
        ExactMatrix::Rational(m)
    }
}
