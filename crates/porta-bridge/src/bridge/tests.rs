use super::*;
use crate::exact::ExactMatrix;
use crate::rep::{HalfspaceRep, VertexRep};
use num_rational::BigRational;
use num_traits::Zero;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const SIMPLEX_IEQ: &str = "\
DIM = 3

VALID
1 0 0

INEQUALITIES_SECTION
(  1) +x1+x2+x3 == 1

(  1) -x2 <= 0
(  2) -x3 <= 0
(  3) +x2+x3 <= 1

END
";

const SIMPLEX_POI: &str = "\
DIM = 3

CONV_SECTION
(  1)  1 0 0
(  2)  0 1 0
(  3)  0 0 1

END
";

/// Fake `traf`: records its arguments, answers `.poi` with `SIMPLEX_IEQ`
/// and `.ieq` with `SIMPLEX_POI`, appending the output extension.
fn traf_script() -> String {
    format!(
        r#"flag="$1"; shift
for a in "$@"; do last="$a"; done
echo "$flag $*" > "$(dirname "$last")/args.txt"
case "$last" in
  *.poi) cat > "$last.ieq" <<'PORTA'
{SIMPLEX_IEQ}PORTA
  ;;
  *.ieq) cat > "$last.poi" <<'PORTA'
{SIMPLEX_POI}PORTA
  ;;
esac
echo "traf finished"
"#
    )
}

struct Fixture {
    _tools: TempDir,
    base: TempDir,
    solver: Solver,
}

impl Fixture {
    fn new(script: &str) -> Self {
        let tools = tempfile::tempdir().unwrap();
        let path = tools.path().join("fake_xporta.sh");
        fs::write(&path, script).unwrap();
        let solver = Solver::new("sh").with_prefix_args([path.to_string_lossy().into_owned()]);
        Self {
            _tools: tools,
            base: tempfile::tempdir().unwrap(),
            solver,
        }
    }

    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            solver: self.solver.clone(),
            base_dir: self.base.path().to_path_buf(),
            ..ConvertOptions::default()
        }
    }

    fn base_entries(&self) -> usize {
        fs::read_dir(self.base.path()).unwrap().count()
    }
}

fn simplex() -> VertexRep {
    VertexRep::from_vertices(
        ExactMatrix::int(vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]).unwrap(),
    )
    .unwrap()
}

fn dot(row: &[BigRational], point: &[BigRational]) -> BigRational {
    row.iter()
        .zip(point)
        .fold(BigRational::zero(), |acc, (a, x)| acc + a * x)
}

#[test]
fn simplex_vertices_to_halfspaces() {
    let fx = Fixture::new(&traf_script());
    let ieq = convert(&simplex(), &fx.options()).unwrap();

    assert_eq!(ieq.dimension(), Some(3));
    assert_eq!(ieq.equalities(), &ExactMatrix::int(vec![vec![1, 1, 1, 1]]).unwrap());
    assert_eq!(ieq.inequalities().rows(), 3);

    // every inequality is valid on the simplex and tight on exactly one edge
    let verts = simplex().vertices().to_rational();
    let ineqs = ieq.inequalities().to_rational();
    for row in ineqs.iter_rows() {
        let (beta, alpha) = row.split_last().unwrap();
        let tight = verts
            .iter_rows()
            .filter(|v| {
                let lhs = dot(alpha, v);
                assert!(&lhs <= beta);
                &lhs == beta
            })
            .count();
        assert_eq!(tight, 2);
    }
    assert_eq!(fx.base_entries(), 0, "workspace must be removed");
}

#[test]
fn halfspaces_to_vertices() {
    let fx = Fixture::new(&traf_script());
    let ieq = parse_ieq_fixture();
    let poi = convert(&ieq, &fx.options()).unwrap();
    assert_eq!(poi, simplex());
    assert_eq!(fx.base_entries(), 0);
}

fn parse_ieq_fixture() -> HalfspaceRep {
    crate::codec::parse_halfspace(SIMPLEX_IEQ).unwrap()
}

#[test]
fn keep_files_leaves_input_output_and_passes_flags() {
    let fx = Fixture::new(&traf_script());
    let options = ConvertOptions {
        keep_files: true,
        filename: "simplex".into(),
        extra_flags: vec!["-o".into(), "-c".into()],
        ..fx.options()
    };
    let done = convert_detailed(&simplex(), &options).unwrap();
    let kept = done.kept_workspace.expect("workspace kept");
    assert!(kept.starts_with(fx.base.path()));
    assert!(kept.join("simplex.poi").is_file());
    assert!(kept.join("simplex.poi.ieq").is_file());
    assert!(done.solver_output.contains("traf finished"));

    let args = fs::read_to_string(kept.join("args.txt")).unwrap();
    let input = kept.join("simplex.poi");
    assert_eq!(args.trim(), format!("-T -o -c {}", input.display()));
}

#[test]
fn solver_failure_reports_exit_code_and_output() {
    let fx = Fixture::new("echo 'bad input'\necho 'oops' >&2\nexit 3\n");
    let err = convert(&simplex(), &fx.options()).unwrap_err();
    match err {
        BridgeError::Solver {
            exit_code,
            captured_output,
        } => {
            assert_eq!(exit_code, Some(3));
            assert!(captured_output.contains("bad input"));
            assert!(captured_output.contains("oops"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.base_entries(), 0, "workspace removed after failure");
}

#[test]
fn verbose_forwards_stdout_but_still_captures_stderr() {
    let fx = Fixture::new("echo 'progress'\necho 'oops' >&2\nexit 1\n");
    let options = ConvertOptions {
        verbose: true,
        ..fx.options()
    };
    let Err(BridgeError::Solver {
        captured_output, ..
    }) = convert(&simplex(), &options)
    else {
        panic!("expected solver failure");
    };
    assert!(!captured_output.contains("progress"));
    assert!(captured_output.contains("oops"));
}

#[test]
fn failure_with_keep_files_leaves_input() {
    let fx = Fixture::new("exit 2\n");
    let options = ConvertOptions {
        keep_files: true,
        ..fx.options()
    };
    let err = convert_detailed(&simplex(), &options).unwrap_err();
    assert!(
        matches!(err.error, BridgeError::Solver { exit_code: Some(2), .. }),
        "{err}"
    );
    let kept = err.kept_workspace.expect("kept workspace reported on failure");
    assert!(kept.starts_with(fx.base.path()));
    assert!(kept.join("traf_tmp.poi").is_file());
    assert_eq!(fx.base_entries(), 1);
}

#[test]
fn failure_without_keep_files_reports_no_workspace() {
    let fx = Fixture::new("exit 2\n");
    let err = convert_detailed(&simplex(), &fx.options()).unwrap_err();
    assert!(err.kept_workspace.is_none());
    assert_eq!(err.to_string(), err.error.to_string());
    assert_eq!(fx.base_entries(), 0);

    let options = ConvertOptions {
        keep_files: true,
        filename: "../escape".into(),
        ..fx.options()
    };
    let err = convert_detailed(&simplex(), &options).unwrap_err();
    assert!(matches!(err.error, BridgeError::InvalidFilename(_)));
    assert!(err.kept_workspace.is_none());
}

#[test]
fn teardown_failure_keeps_the_solver_error() {
    let script = r#"for a in "$@"; do last="$a"; done
rm -rf "$(dirname "$last")"
echo 'gone' >&2
exit 4
"#;
    let fx = Fixture::new(script);
    let err = convert_detailed(&simplex(), &fx.options()).unwrap_err();
    match err.error {
        BridgeError::Solver {
            exit_code,
            captured_output,
        } => {
            assert_eq!(exit_code, Some(4));
            assert!(captured_output.contains("gone"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.kept_workspace.is_none());
    assert_eq!(fx.base_entries(), 0);
}

#[test]
fn zero_exit_without_output_is_missing_output() {
    let fx = Fixture::new("exit 0\n");
    let err = convert(&simplex(), &fx.options()).unwrap_err();
    assert!(
        matches!(
            err,
            BridgeError::MissingOutput {
                fault: OutputFault::Absent,
                ..
            }
        ),
        "{err}"
    );
    assert_eq!(fx.base_entries(), 0);
}

#[test]
fn malformed_output_is_missing_output() {
    let script = r#"for a in "$@"; do last="$a"; done
printf 'DIM = 3\nINEQUALITIES_SECTION\nnonsense\n' > "$last.ieq"
"#;
    let fx = Fixture::new(script);
    let err = convert(&simplex(), &fx.options()).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::MissingOutput {
            fault: OutputFault::Malformed(_),
            ..
        }
    ));
}

#[test]
fn replaced_extension_output_is_found() {
    let script = format!(
        r#"for a in "$@"; do last="$a"; done
cat > "${{last%.poi}}.ieq" <<'PORTA'
{SIMPLEX_IEQ}PORTA
"#
    );
    let fx = Fixture::new(&script);
    let ieq = convert(&simplex(), &fx.options()).unwrap();
    assert_eq!(ieq.inequalities().rows(), 3);
}

#[test]
fn missing_binary_is_spawn_error() {
    let fx = Fixture::new("");
    let options = ConvertOptions {
        solver: Solver::new(fx.base.path().join("no_such_xporta")),
        ..fx.options()
    };
    let err = convert(&simplex(), &options).unwrap_err();
    assert!(matches!(err, BridgeError::Spawn { .. }), "{err}");
    assert_eq!(fx.base_entries(), 0);
}

#[test]
fn unusable_base_dir_is_io_error() {
    let fx = Fixture::new(&traf_script());
    let options = ConvertOptions {
        base_dir: fx.base.path().join("missing"),
        ..fx.options()
    };
    assert!(matches!(
        convert(&simplex(), &options),
        Err(BridgeError::Io { .. })
    ));
}

#[test]
fn filename_must_be_plain() {
    let fx = Fixture::new(&traf_script());
    for name in ["", "../escape", "a/b", ".."] {
        let options = ConvertOptions {
            filename: name.into(),
            ..fx.options()
        };
        assert!(matches!(
            convert(&simplex(), &options),
            Err(BridgeError::InvalidFilename(_))
        ));
    }
}

#[test]
fn cancellation_kills_solver_and_cleans_up() {
    let fx = Fixture::new("exec sleep 30\n");
    let token = CancelToken::new();
    let options = ConvertOptions {
        cancel: Some(token.clone()),
        ..fx.options()
    };
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        token.cancel();
    });
    let started = Instant::now();
    let err = convert(&simplex(), &options).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err, BridgeError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(fx.base_entries(), 0);
}

#[test]
fn concurrent_conversions_do_not_interfere() {
    // answers with a valid point of the input's dimension
    let script = r#"for a in "$@"; do last="$a"; done
dim=$(sed -n 's/^DIM = //p' "$last")
row=""
i=0
while [ "$i" -lt "$dim" ]; do row="$row $i"; i=$((i+1)); done
printf 'DIM = %s\nVALID\n%s\nEND\n' "$dim" "$row" > "$last.ieq"
"#;
    let a = Fixture::new(script);
    let b = Fixture::new(script);
    let square = VertexRep::from_vertices(ExactMatrix::int(vec![vec![0, 0], vec![1, 1]]).unwrap())
        .unwrap();
    let opts_a = a.options();
    let opts_b = b.options();

    let (ra, rb) = thread::scope(|s| {
        let ha = s.spawn(|| convert(&square, &opts_a));
        let hb = s.spawn(|| convert(&simplex(), &opts_b));
        (ha.join().unwrap(), hb.join().unwrap())
    });
    assert_eq!(ra.unwrap().dimension(), Some(2));
    assert_eq!(rb.unwrap().dimension(), Some(3));
    assert_eq!(a.base_entries(), 0);
    assert_eq!(b.base_entries(), 0);
}

#[test]
fn raw_invocation_passes_arguments_verbatim() {
    let fx = Fixture::new("echo \"args: $*\"\n");
    let run = run_xporta(
        &fx.solver,
        "-D",
        &["-x".into(), "file.ieq".into()],
        fx.base.path(),
        false,
    )
    .unwrap();
    assert_eq!(run.output.trim(), "args: -D -x file.ieq");

    let run = run_routine(&fx.solver, Routine::PortSort, &["f.poi".into()], fx.base.path(), false)
        .unwrap();
    assert_eq!(run.output.trim(), "args: -S f.poi");
}

#[test]
fn routine_flags_and_names() {
    for r in Routine::ALL {
        assert_eq!(Routine::from_flag(r.flag()), Some(r));
        assert_eq!(r.name().parse::<Routine>(), Ok(r));
        assert_eq!(r.flag().parse::<Routine>(), Ok(r));
    }
    assert_eq!("sort".parse::<Routine>(), Ok(Routine::PortSort));
    assert_eq!("TRAF".parse::<Routine>(), Ok(Routine::Traf));
    assert!("-X".parse::<Routine>().is_err());
}

#[test]
fn solver_from_env_defaults_to_path_lookup() {
    // only checks the fallback shape; the variable may be set by the caller
    let solver = Solver::from_env();
    assert!(solver.prefix_args.is_empty());
    assert!(!solver.program.as_os_str().is_empty());
    assert_eq!(Solver::default().program, Path::new(DEFAULT_PROGRAM));
}
