//! Arbitrary precision numbers using dashu
//!
//! Integer literals stay exact (`IBig`). Literals with a decimal point use
//! dashu-float's `DBig`, a base-10 float, so recalculated sums never pick up
//! binary representation drift. Mixed operations promote to decimal.

use dashu_base::{Abs, Approximation};
use dashu_float::ops::SquareRoot;
use dashu_float::DBig;
use dashu_int::IBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),
}

/// Working precision (significant decimal digits) for decimal literals and
/// integer-to-decimal promotion.
pub const DEFAULT_PRECISION: u32 = 28;

/// Digits carried past the requested precision inside series evaluation
const GUARD_DIGITS: u32 = 10;

/// Upper bound on Taylor terms for one evaluation
const MAX_SERIES_TERMS: i64 = 2000;

const PI_STR: &str = "3.14159265358979323846264338327950288419716939937510582097494459230781640628620899862803482534211706798214808651328230664709384460955058223172535940812848111745028410270193852110555964462294895493038196442881097566593344612847564823378678316527120190914564856692346034861045432664821339360726024914127372458700660631558817488152092096282925409171536436789259036001133053054882046652138414695194151160943305727036575959195309218611738193261179310511854807446237996274956735188575272489122793818301194912";

/// Exact integer or arbitrary precision decimal.
///
/// All operations return Results or new Numbers - never panic.
#[derive(Debug, Clone)]
pub enum Number {
    Integer(IBig),
    Decimal(DBig),
}

impl Number {
    // ========== Construction ==========

    fn with_precision(val: DBig, precision: u32) -> DBig {
        match val.with_precision(precision as usize) {
            Approximation::Exact(v) | Approximation::Inexact(v, _) => v,
        }
    }

    /// Create an integer
    pub fn from_i64(n: i64) -> Self {
        Number::Integer(IBig::from(n))
    }

    /// Pi at the requested number of significant digits
    pub fn pi(precision: u32) -> Self {
        // two guard digits past the requested precision, then round
        let end_pos = (precision as usize + 3).min(PI_STR.len());
        let inner: DBig = PI_STR[..end_pos]
            .parse()
            .unwrap_or_else(|_| DBig::from(355i64) / DBig::from(113i64));
        Number::Decimal(Self::with_precision(inner, precision))
    }

    // ========== Predicates ==========

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => *i == IBig::ZERO,
            Number::Decimal(d) => *d == DBig::ZERO,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Integer(i) => *i < IBig::ZERO,
            Number::Decimal(d) => *d < DBig::ZERO,
        }
    }

    /// True for values that came from (or stayed in) exact integer arithmetic
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    // ========== Conversion ==========

    /// Promote to a decimal carrying at least `precision` significant digits
    pub fn to_decimal(&self, precision: u32) -> DBig {
        match self {
            Number::Integer(i) => Self::with_precision(DBig::from_parts(i.clone(), 0), precision),
            Number::Decimal(d) if d.precision() >= precision as usize => d.clone(),
            Number::Decimal(d) => Self::with_precision(d.clone(), precision),
        }
    }

    /// Try to convert to i64 (integers only)
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => i.clone().try_into().ok(),
            Number::Decimal(_) => None,
        }
    }

    // ========== Basic Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a + b),
            _ => Number::Decimal(
                &self.to_decimal(DEFAULT_PRECISION) + &other.to_decimal(DEFAULT_PRECISION),
            ),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a - b),
            _ => Number::Decimal(
                &self.to_decimal(DEFAULT_PRECISION) - &other.to_decimal(DEFAULT_PRECISION),
            ),
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a * b),
            _ => Number::Decimal(
                &self.to_decimal(DEFAULT_PRECISION) * &other.to_decimal(DEFAULT_PRECISION),
            ),
        }
    }

    /// Safe division (returns Result, never panics)
    ///
    /// Two integers divide to an integer only when the division is exact;
    /// otherwise the quotient is a decimal with `precision` significant digits.
    pub fn checked_div(&self, other: &Self, precision: u32) -> Result<Self, NumberError> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        if let (Number::Integer(a), Number::Integer(b)) = (self, other) {
            if (a % b) == IBig::ZERO {
                return Ok(Number::Integer(a / b));
            }
        }
        let quotient = &self.to_decimal(precision) / &other.to_decimal(precision);
        Ok(Number::Decimal(Self::with_precision(quotient, precision)))
    }

    // ========== Transcendental Functions ==========

    /// Square root
    pub fn sqrt(&self, precision: u32) -> Result<Self, NumberError> {
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "square root of negative number".to_string(),
            ));
        }
        if self.is_zero() {
            return Ok(Number::Decimal(DBig::ZERO));
        }
        Ok(Number::Decimal(self.to_decimal(precision).sqrt()))
    }

    /// Sine function (Taylor series on the angle reduced into [-π, π])
    pub fn sin(&self, precision: u32) -> Self {
        if self.is_zero() {
            return Number::Decimal(DBig::ZERO);
        }
        let work = precision + GUARD_DIGITS;
        let x = self.reduce_angle(work);
        let sum = Self::taylor(x.clone(), &x, work, 0);
        Number::Decimal(Self::with_precision(sum, precision))
    }

    /// Cosine function (Taylor series on the angle reduced into [-π, π])
    pub fn cos(&self, precision: u32) -> Self {
        let work = precision + GUARD_DIGITS;
        let x = self.reduce_angle(work);
        let one = Self::with_precision(DBig::ONE, work);
        let sum = Self::taylor(one, &x, work, 1);
        Number::Decimal(Self::with_precision(sum, precision))
    }

    /// `x - k·2π` for the nearest integer `k`, accurate to `work` digits
    /// after the point
    fn reduce_angle(&self, work: u32) -> DBig {
        let x = self.to_decimal(work);
        let int_digits = x.repr().digits() as isize + x.repr().exponent();
        if int_digits <= 0 {
            return x;
        }

        // the subtraction cancels the integer digits
        let work = work + int_digits as u32;
        let x = self.to_decimal(work);
        let two_pi = Self::pi(work).to_decimal(work) * DBig::from(2i64);
        let turns = (&x / &two_pi).round();
        &x - &(turns * two_pi)
    }

    /// Alternating series `first·Σ (-x²)^k / ((2k-s)(2k+1-s))` summed until
    /// a term drops below `10^-work`
    fn taylor(first: DBig, x: &DBig, work: u32, shift: i64) -> DBig {
        let eps = DBig::from_parts(IBig::ONE, -(work as isize));
        let x_squared = x * x;

        let mut sum = first.clone();
        let mut term = first;
        for k in 1..=MAX_SERIES_TERMS {
            let denom = DBig::from((2 * k - shift) * (2 * k + 1 - shift));
            term = -&term * &x_squared / denom;
            sum = &sum + &term;
            if term.clone().abs() < eps {
                break;
            }
        }
        sum
    }

    /// Tangent function (sin/cos)
    pub fn tan(&self, precision: u32) -> Result<Self, NumberError> {
        let cos_x = self.cos(precision);
        if cos_x.is_zero() {
            return Err(NumberError::DomainError(
                "tan undefined at odd multiples of π/2".to_string(),
            ));
        }
        self.sin(precision).checked_div(&cos_x, precision)
    }

    // ========== Display ==========

    /// Exact positional notation, no exponent, no trailing zeros
    fn format_decimal(d: &DBig) -> String {
        let (significand, exponent) = d.clone().into_repr().into_parts();
        let negative = significand < IBig::ZERO;
        let mut digits = significand.to_string();
        if negative {
            digits.remove(0);
        }

        if digits == "0" {
            return digits;
        }

        let mut exponent = exponent;
        while digits.len() > 1 && digits.ends_with('0') {
            digits.pop();
            exponent += 1;
        }

        let body = if exponent >= 0 {
            format!("{}{}", digits, "0".repeat(exponent as usize))
        } else {
            let frac = exponent.unsigned_abs();
            if digits.len() > frac {
                let (int_part, frac_part) = digits.split_at(digits.len() - frac);
                format!("{}.{}", int_part, frac_part)
            } else {
                format!("0.{}{}", "0".repeat(frac - digits.len()), digits)
            }
        };

        if negative {
            format!("-{}", body)
        } else {
            body
        }
    }
}

// ========== Trait Implementations ==========

impl FromStr for Number {
    type Err = NumberError;

    /// Supports: "123", "-42", "3.14", "1."
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('.') {
            let normalized = if s.ends_with('.') {
                format!("{}0", s)
            } else {
                s.to_string()
            };
            let inner: DBig = normalized
                .parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            Ok(Number::Decimal(Self::with_precision(inner, DEFAULT_PRECISION)))
        } else {
            let inner: IBig = s
                .parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;
            Ok(Number::Integer(inner))
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Decimal(d) => write!(f, "{}", Self::format_decimal(d)),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => self.to_decimal(DEFAULT_PRECISION) == other.to_decimal(DEFAULT_PRECISION),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::from_i64(n)
    }
}
