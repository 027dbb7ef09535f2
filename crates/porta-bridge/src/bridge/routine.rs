use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Routine of the `xporta` binary, selected by a single flag.
///
/// Only `Traf` has a typed contract here (`convert`); the others run through
/// `run_routine` with caller-managed files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Routine {
    /// Representation conversion, `.poi` ↔ `.ieq`.
    Traf,
    /// Affine dimension of a polyhedron.
    Dim,
    /// Fourier–Motzkin elimination driven by `ELIMINATION_ORDER`.
    Fmel,
    /// Sort and format a `.poi`/`.ieq` file.
    PortSort,
}

impl Routine {
    pub const ALL: [Routine; 4] = [Routine::Traf, Routine::Dim, Routine::Fmel, Routine::PortSort];

    pub fn flag(self) -> &'static str {
        match self {
            Routine::Traf => "-T",
            Routine::Dim => "-D",
            Routine::Fmel => "-F",
            Routine::PortSort => "-S",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Routine::Traf => "traf",
            Routine::Dim => "dim",
            Routine::Fmel => "fmel",
            Routine::PortSort => "portsort",
        }
    }

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.flag() == flag)
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown routine `{0}` (expected traf, dim, fmel, portsort or their flags)")]
pub struct UnknownRoutine(pub String);

/// Accepts a routine name (`traf`, `sort` as a short alias) or its flag (`-T`).
impl FromStr for Routine {
    type Err = UnknownRoutine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(r) = Self::from_flag(s) {
            return Ok(r);
        }
        match s.to_ascii_lowercase().as_str() {
            "sort" => Ok(Routine::PortSort),
            lower => Self::ALL
                .into_iter()
                .find(|r| r.name() == lower)
                .ok_or_else(|| UnknownRoutine(s.to_string())),
        }
    }
}
