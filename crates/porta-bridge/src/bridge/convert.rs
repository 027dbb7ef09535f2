//! `traf` conversions and the raw invocation path.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{files, PortaFormat};
use crate::rep::{HalfspaceRep, VertexRep};
use crate::workspace::{self, Workspace};

use super::cfg::{ConvertOptions, Solver};
use super::process::{self, SolverRun};
use super::routine::Routine;
use super::{BridgeError, OutputFault};

/// A representation `traf` can convert, paired with what it converts to.
pub trait Convert: PortaFormat {
    type Output: PortaFormat;
}

impl Convert for VertexRep {
    type Output = HalfspaceRep;
}

impl Convert for HalfspaceRep {
    type Output = VertexRep;
}

/// Result of `convert_detailed`.
#[derive(Clone, Debug)]
pub struct Conversion<T> {
    pub output: T,
    /// Workspace left on disk (only with `keep_files`).
    pub kept_workspace: Option<PathBuf>,
    /// Captured solver output (empty parts when forwarded with `verbose`).
    pub solver_output: String,
}

/// Failed `convert_detailed`, with the workspace left behind for inspection.
#[derive(Debug)]
pub struct ConversionError {
    pub error: BridgeError,
    /// Set only with `keep_files` once the workspace exists.
    pub kept_workspace: Option<PathBuf>,
}

impl From<BridgeError> for ConversionError {
    fn from(error: BridgeError) -> Self {
        Self {
            error,
            kept_workspace: None,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

/// Convert `input` to the opposite representation with the solver's `traf`.
pub fn convert<R: Convert>(input: &R, options: &ConvertOptions) -> Result<R::Output, BridgeError> {
    convert_detailed(input, options)
        .map(|c| c.output)
        .map_err(|e| e.error)
}

/// Like `convert`, also reporting the kept workspace and solver output, on
/// failure as well as on success.
pub fn convert_detailed<R: Convert>(
    input: &R,
    options: &ConvertOptions,
) -> Result<Conversion<R::Output>, ConversionError> {
    check_filename(&options.filename)?;
    let ws = workspace::acquire(&options.base_dir, options.keep_files).map_err(|source| {
        BridgeError::io(
            format!("creating workspace under {}", options.base_dir.display()),
            source,
        )
    })?;
    let path = ws.path().to_path_buf();
    let result = traf_in(&ws, input, options);
    let kept_workspace = match (ws.release(), &result) {
        (Ok(kept), Err(err)) => {
            tracing::info!(error = %err, "conversion failed");
            kept
        }
        (Ok(kept), Ok(_)) => kept,
        (Err(cleanup), Err(err)) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                cleanup = %cleanup,
                "conversion failed and its workspace could not be removed"
            );
            None
        }
        (Err(cleanup), Ok(_)) => {
            tracing::warn!(
                path = %path.display(),
                error = %cleanup,
                "failed to remove solver workspace"
            );
            None
        }
    };
    match result {
        Ok((output, run)) => Ok(Conversion {
            output,
            kept_workspace,
            solver_output: run.output,
        }),
        Err(error) => Err(ConversionError {
            error,
            kept_workspace,
        }),
    }
}

fn traf_in<R: Convert>(
    ws: &Workspace,
    input: &R,
    options: &ConvertOptions,
) -> Result<(R::Output, SolverRun), BridgeError> {
    let input_path = files::write_as(ws.path(), &options.filename, input).map_err(|source| {
        BridgeError::io(format!("writing solver input into {}", ws.path().display()), source)
    })?;
    tracing::debug!(path = %input_path.display(), "input written");

    let mut args = options.extra_flags.clone();
    args.push(input_path.to_string_lossy().into_owned());
    let run = process::run(
        &options.solver,
        Routine::Traf.flag(),
        &args,
        ws.path(),
        options.verbose,
        options.cancel.as_ref(),
    )?;

    let output = read_output::<R::Output>(&input_path)?;
    tracing::debug!("output parsed");
    Ok((output, run))
}

/// `traf_tmp.poi` → `traf_tmp.poi.ieq`, falling back to `traf_tmp.ieq`.
fn output_candidates(input_path: &Path, ext: &str) -> [PathBuf; 2] {
    let mut appended = input_path.as_os_str().to_owned();
    appended.push(".");
    appended.push(ext);
    [PathBuf::from(appended), input_path.with_extension(ext)]
}

fn read_output<T: PortaFormat>(input_path: &Path) -> Result<T, BridgeError> {
    let [primary, fallback] = output_candidates(input_path, T::EXTENSION);
    let Some(path) = [primary.clone(), fallback].into_iter().find(|p| p.is_file()) else {
        return Err(BridgeError::MissingOutput {
            path: primary,
            fault: OutputFault::Absent,
        });
    };
    let text = fs::read_to_string(&path).map_err(|e| BridgeError::MissingOutput {
        path: path.clone(),
        fault: OutputFault::Unreadable(e),
    })?;
    T::from_text(&text).map_err(|e| BridgeError::MissingOutput {
        path,
        fault: OutputFault::Malformed(e),
    })
}

fn check_filename(name: &str) -> Result<(), BridgeError> {
    let plain = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
    if plain && name != "." && name != ".." {
        Ok(())
    } else {
        Err(BridgeError::InvalidFilename(name.to_string()))
    }
}

/// Raw invocation: `xporta <flag> <args…>` in `cwd`, nothing written or read.
///
/// The caller owns flag semantics and file handling.
pub fn run_xporta(
    solver: &Solver,
    flag: &str,
    args: &[String],
    cwd: &Path,
    verbose: bool,
) -> Result<SolverRun, BridgeError> {
    process::run(solver, flag, args, cwd, verbose, None)
}

/// `run_xporta` with a typed routine selector.
pub fn run_routine(
    solver: &Solver,
    routine: Routine,
    args: &[String],
    cwd: &Path,
    verbose: bool,
) -> Result<SolverRun, BridgeError> {
    run_xporta(solver, routine.flag(), args, cwd, verbose)
}
