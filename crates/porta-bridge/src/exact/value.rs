//! Single exact entries and their text form (`p` or `p/q`).

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// One matrix entry: an arbitrary-precision integer or a reduced rational.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exact {
    Int(BigInt),
    Rational(BigRational),
}

impl Exact {
    #[inline]
    pub fn is_rational(&self) -> bool {
        matches!(self, Exact::Rational(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Exact::Int(n) => n.is_zero(),
            Exact::Rational(r) => r.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Exact::Int(n) => n.is_negative(),
            Exact::Rational(r) => r.is_negative(),
        }
    }

    /// `|v| == 1`
    pub fn is_unit(&self) -> bool {
        match self {
            Exact::Int(n) => n.abs().is_one(),
            Exact::Rational(r) => r.abs().is_one(),
        }
    }

    pub fn abs(&self) -> Exact {
        match self {
            Exact::Int(n) => Exact::Int(n.abs()),
            Exact::Rational(r) => Exact::Rational(r.abs()),
        }
    }

    pub fn to_rational(&self) -> BigRational {
        match self {
            Exact::Int(n) => BigRational::from_integer(n.clone()),
            Exact::Rational(r) => r.clone(),
        }
    }

    pub fn into_rational(self) -> BigRational {
        match self {
            Exact::Int(n) => BigRational::from_integer(n),
            Exact::Rational(r) => r,
        }
    }
}

impl std::ops::Neg for Exact {
    type Output = Exact;
    fn neg(self) -> Exact {
        match self {
            Exact::Int(n) => Exact::Int(-n),
            Exact::Rational(r) => Exact::Rational(-r),
        }
    }
}

impl From<BigInt> for Exact {
    fn from(n: BigInt) -> Self {
        Exact::Int(n)
    }
}

impl From<BigRational> for Exact {
    fn from(r: BigRational) -> Self {
        Exact::Rational(r)
    }
}

impl From<i64> for Exact {
    fn from(n: i64) -> Self {
        Exact::Int(BigInt::from(n))
    }
}

impl fmt::Display for Exact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exact::Int(n) => write!(f, "{n}"),
            Exact::Rational(r) => write_rational(f, r),
        }
    }
}

/// Integral rationals print without a denominator so the text re-parses as
/// an integer; equality after promotion makes that lossless.
pub(crate) fn write_rational(f: &mut fmt::Formatter<'_>, r: &BigRational) -> fmt::Result {
    if r.denom().is_one() {
        write!(f, "{}", r.numer())
    } else {
        write!(f, "{}/{}", r.numer(), r.denom())
    }
}

/// Shorthand for `BigRational::new(numer, denom)`; the result is reduced.
///
/// Panics if `denom == 0`, like `BigRational::new`.
pub fn ratio(numer: i64, denom: i64) -> BigRational {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Parse one token: a signed decimal integer or `p/q` with `q != 0`.
///
/// Returns `None` for anything else (including `1.5`, `0x10`, `1_000`).
pub fn parse_exact(token: &str) -> Option<Exact> {
    match token.split_once('/') {
        None => parse_int(token).map(Exact::Int),
        Some((p, q)) => {
            let numer = parse_int(p)?;
            let denom = parse_int(q)?;
            if denom.is_zero() {
                return None;
            }
            Some(Exact::Rational(BigRational::new(numer, denom)))
        }
    }
}

pub(crate) fn parse_int(s: &str) -> Option<BigInt> {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: BigInt = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
