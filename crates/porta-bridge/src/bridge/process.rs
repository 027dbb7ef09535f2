//! Spawning and awaiting the solver process.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use super::cfg::{CancelToken, Solver};
use super::BridgeError;

/// Poll interval while a cancellable run is in flight.
const POLL: Duration = Duration::from_millis(5);

/// A solver run that exited with status 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverRun {
    /// Captured stdout (unless forwarded) followed by stderr.
    pub output: String,
}

/// Run `program prefix_args… flag args…` in `cwd` and wait for it.
///
/// Output goes to anonymous temp files rather than pipes, so a chatty solver
/// cannot block on a full pipe while we poll for cancellation.
pub(crate) fn run(
    solver: &Solver,
    flag: &str,
    args: &[String],
    cwd: &Path,
    verbose: bool,
    cancel: Option<&CancelToken>,
) -> Result<SolverRun, BridgeError> {
    let stdout_capture = capture_file()?;
    let stderr_capture = capture_file()?;

    let mut cmd = Command::new(&solver.program);
    cmd.args(&solver.prefix_args)
        .arg(flag)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stderr(Stdio::from(clone_handle(&stderr_capture)?));
    if verbose {
        cmd.stdout(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::from(clone_handle(&stdout_capture)?));
    }

    tracing::debug!(program = %solver.program.display(), flag, ?args, cwd = %cwd.display(), "spawning solver");
    let child = cmd.spawn().map_err(|source| BridgeError::Spawn {
        program: solver.program.clone(),
        source,
    })?;
    let status = wait(child, cancel)?;

    let mut output = if verbose {
        String::new()
    } else {
        read_capture(stdout_capture)?
    };
    output.push_str(&read_capture(stderr_capture)?);
    tracing::debug!(code = ?status.code(), captured = output.len(), "solver exited");

    if status.success() {
        Ok(SolverRun { output })
    } else {
        Err(BridgeError::Solver {
            exit_code: status.code(),
            captured_output: output,
        })
    }
}

fn wait(mut child: Child, cancel: Option<&CancelToken>) -> Result<ExitStatus, BridgeError> {
    let waiting = |source| BridgeError::io("waiting for solver", source);
    let Some(cancel) = cancel else {
        return child.wait().map_err(waiting);
    };
    loop {
        if let Some(status) = child.try_wait().map_err(waiting)? {
            return Ok(status);
        }
        if cancel.is_cancelled() {
            // the child may have exited between the two checks; kill then fails harmlessly
            if let Err(err) = child.kill() {
                tracing::debug!(error = %err, "kill after cancellation");
            }
            child.wait().map_err(waiting)?;
            tracing::debug!("solver cancelled");
            return Err(BridgeError::Cancelled);
        }
        thread::sleep(POLL);
    }
}

fn capture_file() -> Result<File, BridgeError> {
    tempfile::tempfile().map_err(|source| BridgeError::io("creating output capture file", source))
}

fn clone_handle(file: &File) -> Result<File, BridgeError> {
    file.try_clone()
        .map_err(|source| BridgeError::io("duplicating output capture handle", source))
}

fn read_capture(mut file: File) -> Result<String, BridgeError> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut buf))
        .map_err(|source| BridgeError::io("reading captured solver output", source))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
