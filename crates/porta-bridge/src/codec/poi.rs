//! `.poi` files: `CONV_SECTION` (vertices), `CONE_SECTION` (rays), `VALID`.

use std::fmt;

use crate::exact::ExactMatrix;
use crate::rep::VertexRep;

use super::lines::{parse_values, scan, write_dim, write_index, write_plain_row, Layout, RowBuf};
use super::{FormatError, FormatErrorKind};

const CONV: &str = "CONV_SECTION";
const CONE: &str = "CONE_SECTION";
const VALID: &str = "VALID";

const LAYOUT: Layout = Layout {
    headers: &[CONV, CONE, VALID],
    ordered: &[CONV, CONE],
};

pub fn parse_vertex(text: &str) -> Result<VertexRep, FormatError> {
    let doc = scan(text, &LAYOUT)?;
    let mut vertices = RowBuf::default();
    let mut rays = RowBuf::default();
    let mut valid = RowBuf::default();
    for row in doc.rows {
        let values = parse_values(row.line, row.body, doc.dim)?;
        match row.section {
            CONV => vertices.push(row.line, values),
            CONE => rays.push(row.line, values),
            _ => {
                if !valid.is_empty() {
                    return Err(FormatError::new(
                        row.line,
                        FormatErrorKind::MultipleValidPoints,
                    ));
                }
                valid.push(row.line, values);
            }
        }
    }
    VertexRep::new(
        Some(vertices.into_matrix()?),
        Some(rays.into_matrix()?),
        Some(valid.into_matrix()?),
    )
    .map_err(|e| FormatError::new(doc.last_line, e.into()))
}

pub fn serialize_vertex(rep: &VertexRep) -> String {
    PoiText(rep).to_string()
}

struct PoiText<'a>(&'a VertexRep);

impl fmt::Display for PoiText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rep = self.0;
        write_dim(f, rep.dimension())?;
        write_indexed(f, CONV, rep.vertices())?;
        write_indexed(f, CONE, rep.rays())?;
        if !rep.valid_point().is_empty() {
            writeln!(f, "{VALID}")?;
            write_plain_row(f, rep.valid_point(), 0)?;
            writeln!(f)?;
        }
        writeln!(f, "END")
    }
}

fn write_indexed(f: &mut fmt::Formatter<'_>, header: &str, m: &ExactMatrix) -> fmt::Result {
    if m.is_empty() {
        return Ok(());
    }
    writeln!(f, "{header}")?;
    for i in 0..m.rows() {
        write_index(f, i + 1)?;
        write_plain_row(f, m, i)?;
    }
    writeln!(f)
}
