//! Text codec for the solver's `.poi` (vertex) and `.ieq` (halfspace) files.
//!
//! Purpose
//! - Pure functions between descriptors and text; no I/O except the thin
//!   helpers in `files`.
//! - Tolerant reader, canonical writer: the reader accepts what the solver
//!   emits (`(  1)` row numbers, symbolic `x<i>` rows, equalities inside
//!   `INEQUALITIES_SECTION`) as well as the plain `1:` / dense forms; the
//!   writer emits the solver's native form.
//!
//! Line conventions (both formats)
//! - Blank lines and lines starting with `#` are ignored.
//! - `DIM = <n>` comes before every section and before any data row.
//! - Each section appears at most once; `END` ends the document and anything
//!   after it is ignored. A missing `END` is accepted.
//! - Data rows may carry a leading `(<n>)` or `<n>:` index, discarded.
//!
//! Halfspace sign convention
//! - Rows are stored as `[α, β]` meaning `α·x <= β` or `α·x = β`. A row read
//!   as `α·x >= β` is stored as the inequality `[-α, -β]`.

pub(crate) mod files;
mod ieq;
mod lines;
mod poi;

use thiserror::Error;

use crate::exact::ShapeError;
use crate::rep::{HalfspaceRep, VertexRep};

pub use files::{read_ieq, read_poi, write_ieq, write_poi, ReadError, IEQ_EXT, POI_EXT};
pub use ieq::{parse_halfspace, serialize_halfspace};
pub use poi::{parse_vertex, serialize_vertex};

/// Malformed or inconsistent text; `line` is 1-based.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct FormatError {
    pub line: usize,
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub(crate) fn new(line: usize, kind: FormatErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatErrorKind {
    #[error("missing `DIM = <n>` before data")]
    MissingDim,
    #[error("malformed DIM line `{0}`")]
    BadDim(String),
    #[error("`DIM` must precede every section")]
    DimAfterSection,
    #[error("section `{0}` appears twice")]
    DuplicateSection(String),
    #[error("section `{section}` may not follow `{after}`")]
    SectionOrder { section: String, after: String },
    #[error("data row outside of any section")]
    RowOutsideSection,
    #[error("expected {dim} values, found {found}")]
    DimMismatch { dim: usize, found: usize },
    #[error("malformed number `{0}`")]
    BadNumber(String),
    #[error("expected an integer, found `{0}`")]
    NotIntegral(String),
    #[error("missing relation (`<=`, `>=` or `==`)")]
    MissingRelation,
    #[error("unknown relation `{0}`")]
    BadRelation(String),
    #[error("malformed term `{0}`")]
    BadTerm(String),
    #[error("variable x{index} outside 1..={dim}")]
    VariableOutOfRange { index: usize, dim: usize },
    #[error("more than one valid point")]
    MultipleValidPoints,
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// A descriptor with a file form the solver reads and writes.
pub trait PortaFormat: Sized {
    /// File extension without the dot.
    const EXTENSION: &'static str;

    fn to_text(&self) -> String;
    fn from_text(text: &str) -> Result<Self, FormatError>;
}

impl PortaFormat for VertexRep {
    const EXTENSION: &'static str = POI_EXT;

    fn to_text(&self) -> String {
        serialize_vertex(self)
    }
    fn from_text(text: &str) -> Result<Self, FormatError> {
        parse_vertex(text)
    }
}

impl PortaFormat for HalfspaceRep {
    const EXTENSION: &'static str = IEQ_EXT;

    fn to_text(&self) -> String {
        serialize_halfspace(self)
    }
    fn from_text(text: &str) -> Result<Self, FormatError> {
        parse_halfspace(text)
    }
}
