//! Exact polyhedron descriptors and a file bridge to the PORTA `xporta` solver.
//!
//! Layers (leaf first)
//! - `exact`: integer/rational matrices with explicit promotion.
//! - `rep`: `VertexRep` (`.poi`) and `HalfspaceRep` (`.ieq`) value objects.
//! - `codec`: text parse/serialize for both file formats.
//! - `workspace`: scoped temp directory for one solver run.
//! - `bridge`: writes input, runs the solver, parses its output.
//!
//! The polyhedral algorithms themselves stay in the solver; this crate only
//! prepares its inputs and reads its outputs.

pub mod bridge;
pub mod codec;
pub mod exact;
pub mod rep;
pub mod workspace;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use bridge::{convert, BridgeError, ConvertOptions};
pub use codec::{parse_halfspace, parse_vertex, serialize_halfspace, serialize_vertex, FormatError};
pub use exact::{ExactMatrix, ShapeError};
pub use rep::{HalfspaceRep, VertexRep};

/// Common exports for callers.
pub mod prelude {
    pub use crate::bridge::{
        convert, convert_detailed, run_routine, run_xporta, BridgeError, CancelToken, Conversion,
        ConversionError, ConvertOptions, Routine, Solver,
    };
    pub use crate::codec::{
        parse_halfspace, parse_vertex, read_ieq, read_poi, serialize_halfspace, serialize_vertex,
        write_ieq, write_poi, FormatError, PortaFormat,
    };
    pub use crate::exact::{ratio, Exact, ExactMatrix, IntMatrix, Matrix, RationalMatrix, ShapeError};
    pub use crate::rep::{HalfspaceRep, VertexRep};
}
