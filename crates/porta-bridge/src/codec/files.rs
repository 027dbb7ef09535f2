//! Thin filesystem helpers around the codec.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rep::{HalfspaceRep, VertexRep};

use super::{FormatError, PortaFormat};

pub const POI_EXT: &str = "poi";
pub const IEQ_EXT: &str = "ieq";

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// Parse a `.poi` file; other extensions are rejected before reading.
pub fn read_poi(path: impl AsRef<Path>) -> Result<VertexRep, ReadError> {
    read_as(path.as_ref())
}

/// Parse a `.ieq` file; other extensions are rejected before reading.
pub fn read_ieq(path: impl AsRef<Path>) -> Result<HalfspaceRep, ReadError> {
    read_as(path.as_ref())
}

/// Write `dir/<name>.poi` (extension appended if missing); returns the path.
pub fn write_poi(dir: impl AsRef<Path>, name: &str, rep: &VertexRep) -> io::Result<PathBuf> {
    write_as(dir.as_ref(), name, rep)
}

/// Write `dir/<name>.ieq` (extension appended if missing); returns the path.
pub fn write_ieq(dir: impl AsRef<Path>, name: &str, rep: &HalfspaceRep) -> io::Result<PathBuf> {
    write_as(dir.as_ref(), name, rep)
}

pub(crate) fn read_as<R: PortaFormat>(path: &Path) -> Result<R, ReadError> {
    if path.extension().and_then(|e| e.to_str()) != Some(R::EXTENSION) {
        return Err(ReadError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("expected a .{} file", R::EXTENSION),
            ),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    R::from_text(&text).map_err(|source| ReadError::Format {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_as<R: PortaFormat>(dir: &Path, name: &str, rep: &R) -> io::Result<PathBuf> {
    let path = dir.join(with_extension(name, R::EXTENSION));
    fs::write(&path, rep.to_text())?;
    Ok(path)
}

fn with_extension(name: &str, ext: &str) -> String {
    let suffix = format!(".{ext}");
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}
