//! Bridge configuration: which binary to run and how to run it.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Environment variable naming the `xporta` executable.
pub const SOLVER_ENV: &str = "PORTA_XPORTA";
pub const DEFAULT_PROGRAM: &str = "xporta";
/// Base name of the files written into a conversion workspace.
pub const DEFAULT_FILENAME: &str = "traf_tmp";

/// The solver executable plus arguments placed before the routine flag
/// (e.g. a supervising wrapper, or `sh` and a script path).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solver {
    pub program: PathBuf,
    pub prefix_args: Vec<String>,
}

impl Solver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    pub fn with_prefix_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.prefix_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `$PORTA_XPORTA` if set and non-empty, else `xporta` from `PATH`.
    pub fn from_env() -> Self {
        env::var_os(SOLVER_ENV)
            .filter(|v| !v.is_empty())
            .map(Self::new)
            .unwrap_or_else(|| Self::new(DEFAULT_PROGRAM))
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Cooperative cancellation for a running conversion. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for `convert`.
///
/// `Default` resolves the solver through `Solver::from_env` and works in the
/// current directory.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub solver: Solver,
    /// Directory under which the per-run workspace is created.
    pub base_dir: PathBuf,
    /// Base name for the input/output files, without extension.
    pub filename: String,
    /// Leave the workspace on disk after the run.
    pub keep_files: bool,
    /// Forward the solver's stdout instead of capturing it.
    pub verbose: bool,
    /// Passed to the solver verbatim, between the routine flag and the input path.
    pub extra_flags: Vec<String>,
    pub cancel: Option<CancelToken>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            solver: Solver::from_env(),
            base_dir: PathBuf::from("."),
            filename: DEFAULT_FILENAME.to_string(),
            keep_files: false,
            verbose: false,
            extra_flags: Vec::new(),
            cancel: None,
        }
    }
}
