//! `.ieq` files: constraint rows, integer bounds, elimination order, `VALID`.
//!
//! Constraint rows come in two spellings, both accepted on read:
//! - symbolic (what the solver writes): `(  3) -1/2x1+x3 <= 4`
//! - dense: `-1/2 0 1 <= 4`, one coefficient per variable.
//!
//! Relations `<=`/`=<` and `>=`/`=>` make inequalities, `==`/`=` equalities,
//! whichever section the row sits in. `>=` rows are negated on read.

use std::fmt::{self, Write};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::exact::{parse_exact, Exact, ExactMatrix, IntMatrix, Matrix};
use crate::rep::HalfspaceRep;

use super::lines::{parse_values, scan, write_dim, write_index, write_plain_row, Layout, RowBuf};
use super::{FormatError, FormatErrorKind};

const INEQUALITIES: &str = "INEQUALITIES_SECTION";
const EQUALITIES: &str = "EQUALITIES_SECTION";
const LOWER_BOUNDS: &str = "LOWER_BOUNDS";
const UPPER_BOUNDS: &str = "UPPER_BOUNDS";
const ELIMINATION_ORDER: &str = "ELIMINATION_ORDER";
const VALID: &str = "VALID";

const LAYOUT: Layout = Layout {
    headers: &[
        INEQUALITIES,
        EQUALITIES,
        LOWER_BOUNDS,
        UPPER_BOUNDS,
        ELIMINATION_ORDER,
        VALID,
    ],
    ordered: &[],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Relation {
    Le,
    Ge,
    Eq,
}

pub fn parse_halfspace(text: &str) -> Result<HalfspaceRep, FormatError> {
    let doc = scan(text, &LAYOUT)?;
    let dim = doc.dim;
    let mut inequalities = RowBuf::default();
    let mut equalities = RowBuf::default();
    let mut valid = RowBuf::default();
    let mut lower: IntMatrix = Matrix::empty();
    let mut upper: IntMatrix = Matrix::empty();
    let mut order: IntMatrix = Matrix::empty();

    for row in doc.rows {
        match row.section {
            INEQUALITIES | EQUALITIES => {
                let (relation, values) = parse_constraint(row.line, row.body, dim)?;
                match relation {
                    Relation::Le => inequalities.push(row.line, values),
                    Relation::Ge => inequalities.push(row.line, negate(values)),
                    Relation::Eq => equalities.push(row.line, values),
                }
            }
            VALID => {
                if !valid.is_empty() {
                    return Err(FormatError::new(
                        row.line,
                        FormatErrorKind::MultipleValidPoints,
                    ));
                }
                valid.push(row.line, parse_values(row.line, row.body, dim)?);
            }
            section => {
                let values = parse_int_values(row.line, row.body, dim)?;
                let target = match section {
                    LOWER_BOUNDS => &mut lower,
                    UPPER_BOUNDS => &mut upper,
                    _ => &mut order,
                };
                target
                    .push_row(values)
                    .map_err(|e| FormatError::new(row.line, e.into()))?;
            }
        }
    }

    HalfspaceRep::new(
        Some(inequalities.into_matrix()?),
        Some(equalities.into_matrix()?),
        Some(lower),
        Some(upper),
        Some(order),
        Some(valid.into_matrix()?),
    )
    .map_err(|e| FormatError::new(doc.last_line, e.into()))
}

fn negate(values: Vec<Exact>) -> Vec<Exact> {
    values.into_iter().map(|v| -v).collect()
}

fn parse_int_values(line: usize, body: &str, dim: usize) -> Result<Vec<BigInt>, FormatError> {
    parse_values(line, body, dim)?
        .into_iter()
        .map(|v| match v {
            Exact::Int(n) => Ok(n),
            Exact::Rational(r) if r.is_integer() => Ok(r.to_integer()),
            Exact::Rational(r) => Err(FormatError::new(
                line,
                FormatErrorKind::NotIntegral(Exact::Rational(r).to_string()),
            )),
        })
        .collect()
}

/// Split `lhs <rel> rhs`, returning the row `[α_1 … α_dim, β]` as written.
fn parse_constraint(
    line: usize,
    body: &str,
    dim: usize,
) -> Result<(Relation, Vec<Exact>), FormatError> {
    let err = |kind| FormatError::new(line, kind);
    let start = body
        .find(|c: char| matches!(c, '<' | '>' | '='))
        .ok_or_else(|| err(FormatErrorKind::MissingRelation))?;
    let len = body[start..]
        .find(|c: char| !matches!(c, '<' | '>' | '='))
        .unwrap_or(body.len() - start);
    let op = &body[start..start + len];
    let relation = match op {
        "<=" | "=<" => Relation::Le,
        ">=" | "=>" => Relation::Ge,
        "=" | "==" => Relation::Eq,
        other => return Err(err(FormatErrorKind::BadRelation(other.into()))),
    };
    let lhs = body[..start].trim();
    let rhs = body[start + len..].trim();
    let beta = parse_exact(rhs).ok_or_else(|| err(FormatErrorKind::BadNumber(rhs.into())))?;

    let mut row = if lhs.contains('x') {
        parse_symbolic(line, lhs, dim)?
    } else {
        parse_dense(line, lhs, dim)?
    };
    row.push(beta);
    Ok((relation, row))
}

fn parse_dense(line: usize, lhs: &str, dim: usize) -> Result<Vec<Exact>, FormatError> {
    // `0 <= 1` with a lone zero stands for an all-zero left-hand side
    if lhs.split_whitespace().count() == 1 && dim != 1 {
        if let Some(v) = parse_exact(lhs).filter(Exact::is_zero) {
            return Ok(vec![v; dim]);
        }
    }
    parse_values(line, lhs, dim)
}

/// `-1/2x1+x3` → `[-1/2, 0, 1]` for `dim = 3`. Repeated variables add up.
fn parse_symbolic(line: usize, lhs: &str, dim: usize) -> Result<Vec<Exact>, FormatError> {
    let compact: String = lhs.chars().filter(|c| !c.is_whitespace()).collect();
    let mut coeffs = vec![BigRational::zero(); dim];
    let mut any_rational = false;

    for term in split_terms(&compact) {
        let bad = || FormatError::new(line, FormatErrorKind::BadTerm(term.into()));
        let (negative, unsigned) = match term.as_bytes().first() {
            Some(b'-') => (true, &term[1..]),
            Some(b'+') => (false, &term[1..]),
            _ => (false, term),
        };
        let (coef, var) = unsigned.split_once('x').ok_or_else(bad)?;
        let coef = if coef.is_empty() {
            Exact::from(1)
        } else if coef.starts_with(|c: char| c == '+' || c == '-') {
            return Err(bad());
        } else {
            parse_exact(coef).ok_or_else(bad)?
        };
        if !var.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let index: usize = var.parse().map_err(|_| bad())?;
        if index == 0 || index > dim {
            return Err(FormatError::new(
                line,
                FormatErrorKind::VariableOutOfRange { index, dim },
            ));
        }
        any_rational |= coef.is_rational();
        let coef = coef.into_rational();
        coeffs[index - 1] += if negative { -coef } else { coef };
    }

    Ok(coeffs
        .into_iter()
        .map(|c| {
            if any_rational {
                Exact::Rational(c)
            } else {
                Exact::Int(c.to_integer())
            }
        })
        .collect())
}

/// Split before every `+`/`-` that is not the leading character.
fn split_terms(s: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if (c == '+' || c == '-') && i > start {
            terms.push(&s[start..i]);
            start = i;
        }
    }
    if start < s.len() {
        terms.push(&s[start..]);
    }
    terms
}

pub fn serialize_halfspace(rep: &HalfspaceRep) -> String {
    IeqText(rep).to_string()
}

struct IeqText<'a>(&'a HalfspaceRep);

impl fmt::Display for IeqText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rep = self.0;
        write_dim(f, rep.dimension())?;
        if !rep.valid_point().is_empty() {
            writeln!(f, "{VALID}")?;
            write_plain_row(f, rep.valid_point(), 0)?;
            writeln!(f)?;
        }
        write_int_section(f, LOWER_BOUNDS, rep.lower_bounds())?;
        write_int_section(f, UPPER_BOUNDS, rep.upper_bounds())?;
        write_int_section(f, ELIMINATION_ORDER, rep.elimination_order())?;

        let (eqs, ieqs) = (rep.equalities(), rep.inequalities());
        if !eqs.is_empty() || !ieqs.is_empty() {
            writeln!(f, "{INEQUALITIES}")?;
            let mut n = 0;
            for (m, rel) in [(eqs, "=="), (ieqs, "<=")] {
                for i in 0..m.rows() {
                    n += 1;
                    write_index(f, n)?;
                    write_constraint(f, m, i, rel)?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "END")
    }
}

fn write_int_section(f: &mut fmt::Formatter<'_>, header: &str, m: &IntMatrix) -> fmt::Result {
    if m.is_empty() {
        return Ok(());
    }
    writeln!(f, "{header}")?;
    for row in m.iter_rows() {
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{v}")?;
        }
        f.write_char('\n')?;
    }
    writeln!(f)
}

/// `+x1-1/2x3 <= 4`; an all-zero left-hand side prints as `0`.
fn write_constraint(f: &mut fmt::Formatter<'_>, m: &ExactMatrix, i: usize, rel: &str) -> fmt::Result {
    let values = m.row_values(i);
    let Some((beta, alpha)) = values.split_last() else {
        return Ok(());
    };
    let mut wrote_term = false;
    for (j, a) in alpha.iter().enumerate() {
        if a.is_zero() {
            continue;
        }
        f.write_char(if a.is_negative() { '-' } else { '+' })?;
        if !a.is_unit() {
            write!(f, "{}", a.abs())?;
        }
        write!(f, "x{}", j + 1)?;
        wrote_term = true;
    }
    if !wrote_term {
        f.write_char('0')?;
    }
    writeln!(f, " {rel} {beta}")
}
