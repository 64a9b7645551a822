use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DrillError, Result};

/// Separator used in canonical fact tokens
pub const MULTIPLY_GLYPH: char = '×';

/// A single multiplication fact, e.g. `6×7`
///
/// Serializes as its canonical token so the product can never disagree with
/// the factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fact {
  pub factor1: u32,
  pub factor2: u32,
  product: u32,
}

impl Fact {
  /// Build a fact from two positive factors.
  pub fn new(factor1: u32, factor2: u32) -> Result<Self> {
    if factor1 == 0 || factor2 == 0 {
      return Err(DrillError::malformed(
        &format!("{}{}{}", factor1, MULTIPLY_GLYPH, factor2),
        "factors must be positive",
      ));
    }
    let product = factor1.checked_mul(factor2).ok_or_else(|| {
      DrillError::malformed(
        &format!("{}{}{}", factor1, MULTIPLY_GLYPH, factor2),
        "product overflows",
      )
    })?;
    Ok(Self {
      factor1,
      factor2,
      product,
    })
  }

  pub fn product(&self) -> u32 {
    self.product
  }

  /// Canonical token, e.g. `"6×7"`
  pub fn token(&self) -> String {
    self.to_string()
  }

  /// Full equation shown to the learner, e.g. `"6 × 7 = 42"`
  pub fn equation(&self) -> String {
    format!("{} {} {} = {}", self.factor1, MULTIPLY_GLYPH, self.factor2, self.product)
  }
}

impl fmt::Display for Fact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.factor1, MULTIPLY_GLYPH, self.factor2)
  }
}

impl TryFrom<String> for Fact {
  type Error = DrillError;

  fn try_from(token: String) -> Result<Self> {
    parse(&token)
  }
}

impl From<Fact> for String {
  fn from(fact: Fact) -> Self {
    fact.token()
  }
}

impl FromStr for Fact {
  type Err = DrillError;

  fn from_str(s: &str) -> Result<Self> {
    parse(s)
  }
}

/// Parse a fact token of the form `a×b`.
///
/// Surrounding whitespace on each operand is ignored. Signs, zero, anything
/// other than ASCII digits, and more than one `×` are rejected.
pub fn parse(token: &str) -> Result<Fact> {
  let mut parts = token.split(MULTIPLY_GLYPH);
  let (Some(left), Some(right), None) = (parts.next(), parts.next(), parts.next()) else {
    return Err(DrillError::malformed(
      token,
      format!("expected exactly two operands separated by {}", MULTIPLY_GLYPH),
    ));
  };

  let factor1 = parse_operand(token, left)?;
  let factor2 = parse_operand(token, right)?;
  Fact::new(factor1, factor2).map_err(|e| match e {
    DrillError::MalformedFact { reason, .. } => DrillError::malformed(token, reason),
    other => other,
  })
}

fn parse_operand(token: &str, operand: &str) -> Result<u32> {
  let operand = operand.trim();
  if operand.is_empty() {
    return Err(DrillError::malformed(token, "missing operand"));
  }
  if !operand.bytes().all(|b| b.is_ascii_digit()) {
    return Err(DrillError::malformed(
      token,
      format!("operand {:?} is not a positive integer", operand),
    ));
  }
  let value: u32 = operand
    .parse()
    .map_err(|_| DrillError::malformed(token, format!("operand {:?} is too large", operand)))?;
  if value == 0 {
    return Err(DrillError::malformed(token, "factors must be positive"));
  }
  Ok(value)
}
