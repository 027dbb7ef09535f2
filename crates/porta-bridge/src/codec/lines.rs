//! Line scanner shared by both formats: comments, `DIM`, section headers,
//! index prefixes and `END`.

use std::fmt::{self, Write};

use crate::exact::{parse_exact, Exact, ExactMatrix};

use super::{FormatError, FormatErrorKind};

/// Section vocabulary of one format.
pub(crate) struct Layout {
    pub headers: &'static [&'static str],
    /// Sections that, when present, must appear in this relative order.
    pub ordered: &'static [&'static str],
}

pub(crate) struct DataRow<'a> {
    pub line: usize,
    pub section: &'static str,
    pub body: &'a str,
}

pub(crate) struct Document<'a> {
    pub dim: usize,
    pub rows: Vec<DataRow<'a>>,
    /// Line number of `END`, or of the last line if `END` is missing.
    pub last_line: usize,
}

pub(crate) fn scan<'a>(text: &'a str, layout: &Layout) -> Result<Document<'a>, FormatError> {
    let mut dim: Option<usize> = None;
    let mut seen: Vec<&'static str> = Vec::new();
    let mut current: Option<&'static str> = None;
    let mut last_ordered: Option<usize> = None;
    let mut rows = Vec::new();
    let mut last_line = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        last_line = line;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "END" {
            break;
        }
        if let Some(value) = dim_value(trimmed) {
            if !seen.is_empty() {
                return Err(FormatError::new(line, FormatErrorKind::DimAfterSection));
            }
            if dim.is_some() {
                return Err(FormatError::new(
                    line,
                    FormatErrorKind::DuplicateSection("DIM".into()),
                ));
            }
            let parsed = value
                .parse::<usize>()
                .map_err(|_| FormatError::new(line, FormatErrorKind::BadDim(trimmed.into())))?;
            dim = Some(parsed);
            continue;
        }
        if let Some(&header) = layout.headers.iter().find(|&&h| h == trimmed) {
            if dim.is_none() {
                return Err(FormatError::new(line, FormatErrorKind::MissingDim));
            }
            if seen.contains(&header) {
                return Err(FormatError::new(
                    line,
                    FormatErrorKind::DuplicateSection(header.into()),
                ));
            }
            if let Some(rank) = layout.ordered.iter().position(|&h| h == header) {
                if let Some(prev) = last_ordered.filter(|&prev| prev > rank) {
                    return Err(FormatError::new(
                        line,
                        FormatErrorKind::SectionOrder {
                            section: header.into(),
                            after: layout.ordered[prev].into(),
                        },
                    ));
                }
                last_ordered = Some(rank);
            }
            seen.push(header);
            current = Some(header);
            continue;
        }
        let Some(section) = current else {
            let kind = if dim.is_none() {
                FormatErrorKind::MissingDim
            } else {
                FormatErrorKind::RowOutsideSection
            };
            return Err(FormatError::new(line, kind));
        };
        rows.push(DataRow {
            line,
            section,
            body: strip_index(trimmed),
        });
    }

    let dim = dim.ok_or_else(|| FormatError::new(last_line.max(1), FormatErrorKind::MissingDim))?;
    Ok(Document {
        dim,
        rows,
        last_line,
    })
}

/// `DIM = 3`, `DIM=3`, `DIM =3` → `"3"`.
fn dim_value(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("DIM")?.trim_start();
    Some(rest.strip_prefix('=')?.trim())
}

/// Drop a leading `(  7)` or `7:` row number.
pub(crate) fn strip_index(body: &str) -> &str {
    if let Some(rest) = body.strip_prefix('(') {
        if let Some((idx, tail)) = rest.split_once(')') {
            if idx.trim().parse::<usize>().is_ok() {
                return tail.trim_start();
            }
        }
    }
    if let Some((idx, tail)) = body.split_once(':') {
        if idx.trim().parse::<usize>().is_ok() {
            return tail.trim_start();
        }
    }
    body
}

/// Whitespace-separated exact values; exactly `dim` of them.
pub(crate) fn parse_values(line: usize, body: &str, dim: usize) -> Result<Vec<Exact>, FormatError> {
    let values = body
        .split_whitespace()
        .map(|tok| {
            parse_exact(tok)
                .ok_or_else(|| FormatError::new(line, FormatErrorKind::BadNumber(tok.into())))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != dim {
        return Err(FormatError::new(
            line,
            FormatErrorKind::DimMismatch {
                dim,
                found: values.len(),
            },
        ));
    }
    Ok(values)
}

/// Rows collected for one field, with the line of the first row for errors.
#[derive(Default)]
pub(crate) struct RowBuf {
    rows: Vec<Vec<Exact>>,
    first_line: Option<usize>,
}

impl RowBuf {
    pub fn push(&mut self, line: usize, row: Vec<Exact>) {
        self.first_line.get_or_insert(line);
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_matrix(self) -> Result<ExactMatrix, FormatError> {
        let line = self.first_line.unwrap_or(1);
        ExactMatrix::from_exact_rows(self.rows).map_err(|e| FormatError::new(line, e.into()))
    }
}

pub(crate) fn write_dim(f: &mut fmt::Formatter<'_>, dim: Option<usize>) -> fmt::Result {
    writeln!(f, "DIM = {}", dim.unwrap_or(0))?;
    f.write_char('\n')
}

/// `(  n) ` as printed by the solver.
pub(crate) fn write_index(f: &mut fmt::Formatter<'_>, n: usize) -> fmt::Result {
    write!(f, "({n:>3}) ")
}

/// Space-separated entries of row `i`, newline-terminated.
pub(crate) fn write_plain_row(f: &mut fmt::Formatter<'_>, m: &ExactMatrix, i: usize) -> fmt::Result {
    for (j, v) in m.row_values(i).iter().enumerate() {
        if j > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{v}")?;
    }
    f.write_char('\n')
}
