//! Process bridge: run the external `xporta` solver on descriptors.
//!
//! Purpose
//! - `convert` turns a `VertexRep` into a `HalfspaceRep` or back by writing
//!   the input file into a fresh workspace, running the solver's `traf`
//!   routine there, and parsing the file it leaves behind.
//! - `run_xporta` is the raw escape hatch: verbatim flag and arguments, no
//!   file handling.
//!
//! One conversion, stage by stage
//! - workspace acquired → input written → process running →
//!   (exit 0 → output parsed | exit ≠ 0 → `Solver` error | cancelled) →
//!   workspace torn down → result returned.
//! - Teardown runs on every path unless `keep_files` is set; a teardown
//!   failure is logged at warn, together with the conversion error if there
//!   is one, and never replaces the conversion result.
//! - `convert_detailed` reports a kept workspace on failures too
//!   (`ConversionError::kept_workspace`).
//! - No retries. A failed run is reported once.
//!
//! Output location
//! - The solver appends the output extension to the input name
//!   (`traf_tmp.poi` → `traf_tmp.poi.ieq`); `traf_tmp.ieq` is accepted as a
//!   fallback. An exit status of 0 without a readable, parseable output file
//!   is `MissingOutput`, never an empty result.

mod cfg;
mod convert;
mod process;
mod routine;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::FormatError;

pub use cfg::{CancelToken, ConvertOptions, Solver, DEFAULT_FILENAME, DEFAULT_PROGRAM, SOLVER_ENV};
pub use convert::{
    convert, convert_detailed, run_routine, run_xporta, Conversion, ConversionError, Convert,
};
pub use process::SolverRun;
pub use routine::{Routine, UnknownRoutine};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid base filename `{0}`")]
    InvalidFilename(String),
    #[error("failed to start solver `{}`", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("solver failed ({})", exit_label(.exit_code))]
    Solver {
        exit_code: Option<i32>,
        captured_output: String,
    },
    #[error("solver output {} missing or invalid: {fault}", .path.display())]
    MissingOutput {
        path: PathBuf,
        #[source]
        fault: OutputFault,
    },
    #[error("solver run cancelled")]
    Cancelled,
}

impl BridgeError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        BridgeError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Why a successful run still produced no usable output.
#[derive(Debug, Error)]
pub enum OutputFault {
    #[error("file not found")]
    Absent,
    #[error("unreadable")]
    Unreadable(#[source] io::Error),
    #[error("malformed")]
    Malformed(#[source] FormatError),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests;
