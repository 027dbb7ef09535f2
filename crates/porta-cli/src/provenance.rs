//! `<output>.provenance.json` sidecars for files written by `porta traf --out`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run parameters recorded next to an output.
pub struct Payload {
    pub params: Value,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self { params }
    }
}

#[derive(Serialize)]
struct Sidecar<'a> {
    tool: &'static str,
    version: &'static str,
    code_rev: String,
    params: &'a Value,
    outputs: [String; 1],
}

/// Write the sidecar for `artifact` and return its path.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    let doc = Sidecar {
        tool: "porta",
        version: porta_bridge::VERSION,
        code_rev: current_git_rev(),
        params: &payload.params,
        outputs: [artifact.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

/// `out/cube.ieq` → `out/cube.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    option_env!("GIT_COMMIT")
        .filter(|rev| !rev.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok().filter(|rev| !rev.is_empty()))
        .or_else(|| {
            let output = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            output
                .status
                .success()
                .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_path_replaces_extension() {
        let derived = sidecar_path(Path::new("/tmp/out/cube.ieq"));
        assert_eq!(derived, Path::new("/tmp/out/cube.provenance.json"));
    }

    #[test]
    fn write_sidecar_records_params_and_output() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("simplex.ieq");
        fs::write(&artifact, "DIM = 3\nEND\n").unwrap();
        let payload = Payload::new(json!({"routine": "traf", "flags": ["-o"]}));
        let path = write_sidecar(&artifact, payload).unwrap();
        assert_eq!(path, dir.path().join("simplex.provenance.json"));

        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["tool"], "porta");
        assert_eq!(parsed["params"]["flags"][0], "-o");
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert!(parsed["code_rev"].as_str().is_some_and(|rev| !rev.is_empty()));
    }
}
