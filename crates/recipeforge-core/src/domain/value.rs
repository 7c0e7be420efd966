//! Parameter values shared by requirements and offers.
//!
//! A step states what it needs as a [`ValueConstraint`]; a resource states
//! what it can do as an [`OfferValue`]. [`ValueConstraint::is_satisfied_by`]
//! decides whether one covers the other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{MatchError, Result};

/// Relative tolerance used when comparing numeric values for equality.
const EQ_TOLERANCE: f64 = 1e-9;

/// Returns the local name of an IRI-style identifier.
///
/// The local name is the fragment after the last `#`, then after the last
/// `/`, with surrounding whitespace removed.
///
/// # Example
///
/// ```
/// use recipeforge_core::local_name;
///
/// assert_eq!(local_name("http://example.org/caps#Mixing"), "Mixing");
/// assert_eq!(local_name("https://qudt.org/vocab/unit/SEC"), "SEC");
/// assert_eq!(local_name("  Heating "), "Heating");
/// ```
pub fn local_name(iri: &str) -> &str {
    let mut s = iri.trim();
    if let Some(pos) = s.rfind('#') {
        s = &s[pos + 1..];
    }
    if let Some(pos) = s.rfind('/') {
        s = &s[pos + 1..];
    }
    s.trim()
}

/// Returns true if two optional units agree.
///
/// A missing unit on either side is compatible with anything; otherwise the
/// local names must be equal.
pub fn units_compatible(required: Option<&str>, offered: Option<&str>) -> bool {
    match (required, offered) {
        (Some(r), Some(o)) if !r.trim().is_empty() && !o.trim().is_empty() => {
            local_name(r) == local_name(o)
        }
        _ => true,
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EQ_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Relational operator of a numeric requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Comparison {
    /// Returns the textual operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
        }
    }

    /// Evaluates `lhs <op> rhs`.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Eq => approx_eq(lhs, rhs),
            Comparison::Ge => lhs >= rhs || approx_eq(lhs, rhs),
            Comparison::Le => lhs <= rhs || approx_eq(lhs, rhs),
            Comparison::Gt => lhs > rhs && !approx_eq(lhs, rhs),
            Comparison::Lt => lhs < rhs && !approx_eq(lhs, rhs),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error parsing a requirement value string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("empty value")]
    Empty,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),
}

/// What a step requires of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueConstraint {
    /// A numeric setpoint, optionally relaxed by a relational operator.
    Compare { op: Comparison, value: f64 },
    /// A numeric interval that must be covered.
    Range { min: f64, max: f64 },
    /// A symbolic value that must be offered verbatim.
    Categorical { value: String },
}

impl ValueConstraint {
    /// Requires exactly `value`.
    pub fn exact(value: f64) -> Self {
        ValueConstraint::Compare {
            op: Comparison::Eq,
            value,
        }
    }

    /// Requires a numeric comparison.
    pub fn compare(op: Comparison, value: f64) -> Self {
        ValueConstraint::Compare { op, value }
    }

    /// Requires the interval `[min, max]`.
    pub fn range(min: f64, max: f64) -> Self {
        ValueConstraint::Range { min, max }
    }

    /// Requires a symbolic value.
    pub fn categorical(value: impl Into<String>) -> Self {
        ValueConstraint::Categorical {
            value: value.into(),
        }
    }

    /// Checks structural validity.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedConstraint`] for inverted ranges or
    /// non-finite numbers. `context` names the owning parameter.
    pub fn validate(&self, context: &str) -> Result<()> {
        match self {
            ValueConstraint::Compare { value, .. } if !value.is_finite() => Err(
                MatchError::malformed(format!("{context}: value {value} is not finite")),
            ),
            ValueConstraint::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    Err(MatchError::malformed(format!(
                        "{context}: range bounds must be finite"
                    )))
                } else if min > max {
                    Err(MatchError::malformed(format!(
                        "{context}: inverted range [{min}, {max}]"
                    )))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Returns true if `offer` can fulfil this requirement.
    ///
    /// Range offers treat a comparison as a setpoint that has to lie on the
    /// permitted side of each present bound. Discrete offers need one member
    /// in the required relation. An unspecified offer fulfils anything.
    pub fn is_satisfied_by(&self, offer: &OfferValue) -> bool {
        match (self, offer) {
            (_, OfferValue::Unspecified) => true,

            (ValueConstraint::Compare { op, value }, OfferValue::Range { min, max }) => {
                let v = *value;
                if let Some(lo) = *min {
                    match op {
                        Comparison::Eq | Comparison::Ge if v < lo && !approx_eq(v, lo) => {
                            return false
                        }
                        Comparison::Gt if v <= lo || approx_eq(v, lo) => return false,
                        _ => {}
                    }
                }
                if let Some(hi) = *max {
                    match op {
                        Comparison::Eq | Comparison::Le if v > hi && !approx_eq(v, hi) => {
                            return false
                        }
                        Comparison::Lt if v >= hi || approx_eq(v, hi) => return false,
                        _ => {}
                    }
                }
                true
            }
            (ValueConstraint::Range { min, max }, OfferValue::Range { min: lo, max: hi }) => {
                lo.map_or(true, |lo| lo <= *min || approx_eq(lo, *min))
                    && hi.map_or(true, |hi| hi >= *max || approx_eq(hi, *max))
            }

            (ValueConstraint::Compare { op, value }, OfferValue::Discrete(values)) => {
                values.iter().any(|dv| op.holds(*dv, *value))
            }
            (ValueConstraint::Range { min, max }, OfferValue::Discrete(values)) => values
                .iter()
                .any(|dv| Comparison::Ge.holds(*dv, *min) && Comparison::Le.holds(*dv, *max)),

            (ValueConstraint::Categorical { value }, OfferValue::Categorical(labels)) => {
                labels.iter().any(|l| l == value)
            }

            _ => false,
        }
    }
}

impl FromStr for ValueConstraint {
    type Err = ParseValueError;

    /// Parses `[op] number`, `min..max`, `[min, max]`, or a symbolic label.
    ///
    /// A comma is accepted as decimal separator. Inside brackets the bounds
    /// are separated by `;`, by a comma followed by whitespace, or by the
    /// only comma present; `[2,5; 7,5]` is the range 2.5 to 7.5.
    ///
    /// # Example
    ///
    /// ```
    /// use recipeforge_core::{Comparison, ValueConstraint};
    ///
    /// let c: ValueConstraint = ">= 2,5".parse().unwrap();
    /// assert_eq!(c, ValueConstraint::compare(Comparison::Ge, 2.5));
    ///
    /// let r: ValueConstraint = "20..80".parse().unwrap();
    /// assert_eq!(r, ValueConstraint::range(20.0, 80.0));
    ///
    /// let b: ValueConstraint = "[20, 80]".parse().unwrap();
    /// assert_eq!(b, r);
    /// ```
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseValueError::Empty);
        }

        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (lo, hi) = split_bracket_range(inner)
                .ok_or_else(|| ParseValueError::InvalidRange(s.to_string()))?;
            return Ok(ValueConstraint::Range {
                min: parse_number(lo)?,
                max: parse_number(hi)?,
            });
        }

        if let Some((lo, hi)) = s.split_once("..") {
            return Ok(ValueConstraint::Range {
                min: parse_number(lo)?,
                max: parse_number(hi)?,
            });
        }

        let (op, rest) = [
            (">=", Comparison::Ge),
            ("<=", Comparison::Le),
            (">", Comparison::Gt),
            ("<", Comparison::Lt),
            ("=", Comparison::Eq),
        ]
        .iter()
        .find_map(|(prefix, op)| s.strip_prefix(prefix).map(|rest| (*op, rest)))
        .unwrap_or((Comparison::Eq, s));

        let starts_numeric = rest
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.' || c == '+');

        if starts_numeric {
            Ok(ValueConstraint::Compare {
                op,
                value: parse_number(rest)?,
            })
        } else if rest.len() != s.len() {
            Err(ParseValueError::InvalidNumber(rest.trim().to_string()))
        } else {
            Ok(ValueConstraint::categorical(s))
        }
    }
}

/// Splits the inside of `[min, max]` into its two bounds.
fn split_bracket_range(inner: &str) -> Option<(&str, &str)> {
    if let Some(split) = inner.split_once(';') {
        return Some(split);
    }
    let spaced = inner
        .match_indices(',')
        .map(|(pos, _)| pos)
        .find(|&pos| inner[pos + 1..].starts_with(char::is_whitespace));
    if let Some(pos) = spaced {
        return Some((&inner[..pos], &inner[pos + 1..]));
    }
    match inner.matches(',').count() {
        1 => inner.split_once(','),
        _ => None,
    }
}

fn parse_number(s: &str) -> std::result::Result<f64, ParseValueError> {
    let normalized = s.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| ParseValueError::InvalidNumber(s.trim().to_string()))
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConstraint::Compare {
                op: Comparison::Eq,
                value,
            } => write!(f, "{value}"),
            ValueConstraint::Compare { op, value } => write!(f, "{op}{value}"),
            ValueConstraint::Range { min, max } => write!(f, "{min}..{max}"),
            ValueConstraint::Categorical { value } => f.write_str(value),
        }
    }
}

/// What a resource offers for a parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum OfferValue {
    /// Offer without a value; fulfils any requirement on the key.
    #[default]
    Unspecified,
    /// A fixed value or a set of selectable values.
    Discrete(Vec<f64>),
    /// A continuous range; either bound may be open.
    Range { min: Option<f64>, max: Option<f64> },
    /// Symbolic values.
    Categorical(Vec<String>),
}

impl OfferValue {
    /// A single fixed value.
    pub fn fixed(value: f64) -> Self {
        OfferValue::Discrete(vec![value])
    }

    /// A closed range.
    pub fn range(min: f64, max: f64) -> Self {
        OfferValue::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Checks structural validity.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedConstraint`] for inverted ranges or
    /// non-finite numbers.
    pub fn validate(&self, context: &str) -> Result<()> {
        match self {
            OfferValue::Range {
                min: Some(min),
                max: Some(max),
            } if min > max => Err(MatchError::malformed(format!(
                "{context}: inverted offer range [{min}, {max}]"
            ))),
            OfferValue::Range { min, max } => {
                if min.iter().chain(max.iter()).all(|v| v.is_finite()) {
                    Ok(())
                } else {
                    Err(MatchError::malformed(format!(
                        "{context}: offer bounds must be finite"
                    )))
                }
            }
            OfferValue::Discrete(values) if values.iter().any(|v| !v.is_finite()) => Err(
                MatchError::malformed(format!("{context}: offer values must be finite")),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for OfferValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferValue::Unspecified => f.write_str("?"),
            OfferValue::Discrete(values) if values.len() == 1 => write!(f, "{}", values[0]),
            OfferValue::Discrete(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{{{}}}", parts.join(","))
            }
            OfferValue::Range { min, max } => {
                let lo = min.map_or_else(|| "-inf".to_string(), |v| v.to_string());
                let hi = max.map_or_else(|| "inf".to_string(), |v| v.to_string());
                write!(f, "[{lo} - {hi}]")
            }
            OfferValue::Categorical(labels) => write!(f, "{{{}}}", labels.join(",")),
        }
    }
}
