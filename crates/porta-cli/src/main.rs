mod provenance;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use porta_bridge::bridge::{DEFAULT_FILENAME, SOLVER_ENV};
use porta_bridge::codec::{IEQ_EXT, POI_EXT};
use porta_bridge::prelude::*;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "porta")]
#[command(about = "Exact .poi/.ieq tooling around the PORTA xporta solver", version)]
struct Cmd {
    /// Log level for stderr diagnostics (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Clone, Debug)]
struct SolverArgs {
    /// xporta executable
    #[arg(long, env = SOLVER_ENV, default_value = "xporta")]
    xporta: PathBuf,
}

#[derive(Subcommand)]
enum Action {
    /// Convert a .poi file to .ieq or back with xporta's traf routine
    Traf {
        input: PathBuf,
        /// Write the result here (plus a provenance sidecar) instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Directory under which the temporary workspace is created
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Base name for the solver's input/output files
        #[arg(long, default_value = DEFAULT_FILENAME)]
        filename: String,
        /// Keep the workspace after the run
        #[arg(long)]
        keep: bool,
        /// Forward solver stdout
        #[arg(long)]
        verbose: bool,
        /// Extra solver flag, passed verbatim (repeatable)
        #[arg(long = "flag", allow_hyphen_values = true)]
        flags: Vec<String>,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Parse a .poi/.ieq file and print a JSON summary
    Inspect { input: PathBuf },
    /// Run an xporta routine verbatim in a directory
    Raw {
        /// Routine name (traf, dim, fmel, portsort) or flag (-T, -D, ...)
        #[arg(long, allow_hyphen_values = true)]
        method: Routine,
        /// Working directory for the solver
        #[arg(long, default_value = ".")]
        cwd: PathBuf,
        #[arg(long)]
        verbose: bool,
        #[command(flatten)]
        solver: SolverArgs,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(cmd.log_level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Traf {
            input,
            out,
            dir,
            filename,
            keep,
            verbose,
            flags,
            solver,
        } => {
            let options = ConvertOptions {
                solver: Solver::new(solver.xporta),
                base_dir: dir,
                filename,
                keep_files: keep,
                verbose,
                extra_flags: flags,
                cancel: None,
            };
            traf(&input, out.as_deref(), &options)
        }
        Action::Inspect { input } => inspect(&input),
        Action::Raw {
            method,
            cwd,
            verbose,
            solver,
            args,
        } => raw(method, &cwd, verbose, &Solver::new(solver.xporta), &args),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Poi,
    Ieq,
}

impl Kind {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(POI_EXT) => Ok(Kind::Poi),
            Some(IEQ_EXT) => Ok(Kind::Ieq),
            _ => bail!("{}: expected a .poi or .ieq file", path.display()),
        }
    }
}

fn traf(input: &Path, out: Option<&Path>, options: &ConvertOptions) -> Result<()> {
    tracing::info!(input = %input.display(), solver = %options.solver.program.display(), "traf");
    let (text, kept) = match Kind::of(input)? {
        Kind::Poi => {
            let rep = read_poi(input)?;
            let done = convert_detailed(&rep, options).map_err(conversion_failure)?;
            (serialize_halfspace(&done.output), done.kept_workspace)
        }
        Kind::Ieq => {
            let rep = read_ieq(input)?;
            let done = convert_detailed(&rep, options).map_err(conversion_failure)?;
            (serialize_vertex(&done.output), done.kept_workspace)
        }
    };
    if let Some(path) = &kept {
        tracing::info!(workspace = %path.display(), "workspace kept");
    }

    let Some(out) = out else {
        print!("{text}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, &text).with_context(|| format!("writing {}", out.display()))?;
    let params = json!({
        "routine": Routine::Traf.name(),
        "input": input.to_string_lossy(),
        "solver": options.solver.program.to_string_lossy(),
        "flags": options.extra_flags,
        "kept_workspace": kept.map(|p| p.to_string_lossy().into_owned()),
    });
    provenance::write_sidecar(out, provenance::Payload::new(params))?;
    Ok(())
}

/// Surface the solver's own diagnostics before the error bubbles up.
fn solver_failure(err: BridgeError) -> anyhow::Error {
    log_solver_output(&err);
    err.into()
}

fn conversion_failure(err: ConversionError) -> anyhow::Error {
    log_solver_output(&err.error);
    if let Some(path) = &err.kept_workspace {
        tracing::warn!(workspace = %path.display(), "workspace kept after failure");
    }
    err.into()
}

fn log_solver_output(err: &BridgeError) {
    if let BridgeError::Solver {
        captured_output, ..
    } = err
    {
        if !captured_output.is_empty() {
            tracing::error!("solver output:\n{captured_output}");
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    path: String,
    kind: &'static str,
    dim: Option<usize>,
    rational: bool,
    /// Row count per non-empty section.
    sections: BTreeMap<&'static str, usize>,
}

fn summarize(path: &Path) -> Result<Summary> {
    let mut sections = BTreeMap::new();
    let mut count = |name: &'static str, rows: usize| {
        if rows > 0 {
            sections.insert(name, rows);
        }
    };
    let (kind, dim, rational) = match Kind::of(path)? {
        Kind::Poi => {
            let rep = read_poi(path)?;
            count("CONV_SECTION", rep.vertices().rows());
            count("CONE_SECTION", rep.rays().rows());
            count("VALID", rep.valid_point().rows());
            (POI_EXT, rep.dimension(), rep.is_rational())
        }
        Kind::Ieq => {
            let rep = read_ieq(path)?;
            count("INEQUALITIES", rep.inequalities().rows());
            count("EQUALITIES", rep.equalities().rows());
            count("LOWER_BOUNDS", rep.lower_bounds().rows());
            count("UPPER_BOUNDS", rep.upper_bounds().rows());
            count("ELIMINATION_ORDER", rep.elimination_order().rows());
            count("VALID", rep.valid_point().rows());
            (IEQ_EXT, rep.dimension(), rep.is_rational())
        }
    };
    Ok(Summary {
        path: path.to_string_lossy().into_owned(),
        kind,
        dim,
        rational,
        sections,
    })
}

fn inspect(path: &Path) -> Result<()> {
    let summary = summarize(path)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn raw(routine: Routine, cwd: &Path, verbose: bool, solver: &Solver, args: &[String]) -> Result<()> {
    tracing::info!(%routine, cwd = %cwd.display(), ?args, "raw");
    let run = run_routine(solver, routine, args, cwd, verbose).map_err(solver_failure)?;
    print!("{}", run.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn traf_flags_collect_in_order() {
        let cmd = Cmd::try_parse_from([
            "porta", "traf", "cube.poi", "--flag", "-o", "--flag", "-c", "--keep",
        ])
        .unwrap();
        let Action::Traf {
            input, flags, keep, ..
        } = cmd.action
        else {
            panic!("expected traf");
        };
        assert_eq!(input, Path::new("cube.poi"));
        assert_eq!(flags, ["-o", "-c"]);
        assert!(keep);
    }

    #[test]
    fn raw_accepts_flag_or_name() {
        let cmd = Cmd::try_parse_from(["porta", "raw", "--method", "-D", "x.ieq"]).unwrap();
        let Action::Raw { method, args, .. } = cmd.action else {
            panic!("expected raw");
        };
        assert_eq!(method, Routine::Dim);
        assert_eq!(args, ["x.ieq"]);

        let cmd = Cmd::try_parse_from(["porta", "raw", "--method", "fmel"]).unwrap();
        assert!(matches!(cmd.action, Action::Raw { method: Routine::Fmel, .. }));
        assert!(Cmd::try_parse_from(["porta", "raw", "--method", "bogus"]).is_err());
    }

    #[test]
    fn conversion_failure_keeps_the_bridge_message() {
        let err = ConversionError {
            error: BridgeError::Solver {
                exit_code: Some(2),
                captured_output: "bad".into(),
            },
            kept_workspace: Some(PathBuf::from("porta_tmp_x")),
        };
        let err = conversion_failure(err);
        assert_eq!(err.to_string(), "solver failed (exit status 2)");
        let inner = err.downcast_ref::<ConversionError>().unwrap();
        assert_eq!(inner.kept_workspace.as_deref(), Some(Path::new("porta_tmp_x")));
    }

    #[test]
    fn kind_follows_extension() {
        assert_eq!(Kind::of(Path::new("a.poi")).unwrap(), Kind::Poi);
        assert_eq!(Kind::of(Path::new("dir/b.ieq")).unwrap(), Kind::Ieq);
        assert!(Kind::of(Path::new("c.txt")).is_err());
        assert!(Kind::of(Path::new("poi")).is_err());
    }

    #[test]
    fn summary_counts_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("box.ieq");
        fs::write(
            &path,
            "DIM = 2\nLOWER_BOUNDS\n0 0\nINEQUALITIES_SECTION\nx1+x2 == 1\n1/2x1 <= 1\n-x2 <= 0\nEND\n",
        )
        .unwrap();
        let summary = summarize(&path).unwrap();
        assert_eq!(summary.kind, "ieq");
        assert_eq!(summary.dim, Some(2));
        assert!(summary.rational);
        assert_eq!(summary.sections["INEQUALITIES"], 2);
        assert_eq!(summary.sections["EQUALITIES"], 1);
        assert_eq!(summary.sections["LOWER_BOUNDS"], 1);
        assert!(!summary.sections.contains_key("VALID"));
    }
}
