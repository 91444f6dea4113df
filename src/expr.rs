//! Degree-tracked expression algebra over signals and field constants.

use std::collections::BTreeSet;

use super::*;
use crate::error::{CircuitError, Result};

/// Index of a signal across the fully expanded component tree.
///
/// Signals are numbered densely in declaration order; the witness vector
/// position of signal `i` is `i + 1` (position 0 holds the constant `1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub(crate) usize);

impl SignalId {
  /// The column this signal occupies in the witness vector.
  pub const fn witness_column(self) -> usize {
    self.0 + 1
  }
}

/// A combination of field constants and signal references.
///
/// Degree is computed structurally, never by evaluation: constants are
/// degree 0, signals degree 1, sums take the maximum and products the sum
/// of their operands' degrees. Building an expression never fails; the
/// quadratic limit is enforced when the expression reaches a constraint.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expression<F: PrimeField> {
  /// A signal reference.
  Signal(SignalId),
  /// A field constant.
  Constant(F),
  /// Sum of the contained terms.
  Add(Vec<Expression<F>>),
  /// Product of the contained factors.
  Mul(Vec<Expression<F>>),
}

impl<F: PrimeField> Expression<F> {
  /// Shorthand for a constant expression.
  pub const fn constant(c: F) -> Self {
    Self::Constant(c)
  }

  /// The zero expression.
  pub fn zero() -> Self {
    Self::Constant(F::ZERO)
  }

  /// The one expression.
  pub fn one() -> Self {
    Self::Constant(F::ONE)
  }

  /// Structural degree in signals.
  pub fn degree(&self) -> usize {
    match self {
      Self::Constant(_) => 0,
      Self::Signal(_) => 1,
      Self::Add(terms) => terms.iter().map(Self::degree).max().unwrap_or(0),
      Self::Mul(factors) => factors.iter().map(Self::degree).sum(),
    }
  }

  /// The set of signals this expression reads.
  pub fn signals(&self) -> BTreeSet<SignalId> {
    let mut out = BTreeSet::new();
    self.collect_signals(&mut out);
    out
  }

  /// Walks the tree accumulating signal references.
  fn collect_signals(&self, out: &mut BTreeSet<SignalId>) {
    match self {
      Self::Signal(id) => {
        out.insert(*id);
      },
      Self::Constant(_) => {},
      Self::Add(children) | Self::Mul(children) => {
        for child in children {
          child.collect_signals(out);
        }
      },
    }
  }

  /// Folds the expression to a constant if its degree is 0.
  pub fn const_value(&self) -> Option<F> {
    match self {
      Self::Constant(c) => Some(*c),
      Self::Signal(_) => None,
      Self::Add(terms) => {
        let mut sum = F::ZERO;
        for term in terms {
          sum += term.const_value()?;
        }
        Some(sum)
      },
      Self::Mul(factors) => {
        let mut product = F::ONE;
        for factor in factors {
          product *= factor.const_value()?;
        }
        Some(product)
      },
    }
  }

  /// Multiplies by a constant scalar.
  pub fn scale(self, k: F) -> Self {
    Self::Mul(vec![Self::Constant(k), self])
  }

  /// Multiplication that enforces the quadratic degree limit up front.
  ///
  /// The `*` operator builds products freely (degrees are re-checked at
  /// emission); this is for call sites that want the failure early.
  pub fn checked_mul(self, rhs: Self) -> Result<Self> {
    let degree = self.degree() + rhs.degree();
    if degree > 2 {
      return Err(CircuitError::DegreeExceeded { degree });
    }
    Ok(self * rhs)
  }

  /// Division, defined only for divisors of signal degree 0.
  ///
  /// A nonzero constant divisor is folded into multiplication by its
  /// modular inverse at compile time; a zero divisor is rejected here,
  /// never deferred to evaluation.
  pub fn div(self, divisor: &Self) -> Result<Self> {
    let Some(value) = divisor.const_value() else {
      return Err(CircuitError::DivisionBySignal);
    };
    let inverse = value.inverse().ok_or(CircuitError::DivisionByZero)?;
    Ok(self.scale(inverse))
  }
}

impl<F: PrimeField> std::ops::Add for Expression<F> {
  type Output = Self;

  fn add(self, rhs: Self) -> Self::Output {
    match (self, rhs) {
      (Self::Add(mut v1), Self::Add(v2)) => {
        v1.extend(v2);
        Self::Add(v1)
      },
      (Self::Add(mut v), rhs) => {
        v.push(rhs);
        Self::Add(v)
      },
      (lhs, Self::Add(mut v)) => {
        v.insert(0, lhs);
        Self::Add(v)
      },
      (lhs, rhs) => Self::Add(vec![lhs, rhs]),
    }
  }
}

impl<F: PrimeField> std::ops::Mul for Expression<F> {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self::Output {
    match (self, rhs) {
      (Self::Mul(mut v1), Self::Mul(v2)) => {
        v1.extend(v2);
        Self::Mul(v1)
      },
      (Self::Mul(mut v), rhs) => {
        v.push(rhs);
        Self::Mul(v)
      },
      (lhs, Self::Mul(mut v)) => {
        v.insert(0, lhs);
        Self::Mul(v)
      },
      (lhs, rhs) => Self::Mul(vec![lhs, rhs]),
    }
  }
}

impl<F: PrimeField> std::ops::Neg for Expression<F> {
  type Output = Self;

  fn neg(self) -> Self::Output {
    // Negation is multiplication by -1
    Self::Mul(vec![Self::Constant(-F::ONE), self])
  }
}

impl<F: PrimeField> std::ops::Sub for Expression<F> {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self::Output {
    // a - b is the same as a + (-b)
    self + (-rhs)
  }
}

impl<F: PrimeField> Display for Expression<F> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Self::Signal(id) => write!(f, "s_{}", id.0),
      Self::Constant(c) => write!(f, "{c}"),
      Self::Add(terms) => {
        write!(f, "(")?;
        for (i, term) in terms.iter().enumerate() {
          if i > 0 {
            write!(f, " + ")?;
          }
          write!(f, "{term}")?;
        }
        write!(f, ")")
      },
      Self::Mul(factors) => {
        write!(f, "(")?;
        for (i, factor) in factors.iter().enumerate() {
          if i > 0 {
            write!(f, " * ")?;
          }
          write!(f, "{factor}")?;
        }
        write!(f, ")")
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use ark_ff::Field;

  use super::*;
  use crate::mock::F17;

  fn sig(i: usize) -> Expression<F17> {
    Expression::Signal(SignalId(i))
  }

  #[test]
  fn degree_base_cases() {
    assert_eq!(Expression::<F17>::constant(F17::from(5)).degree(), 0);
    assert_eq!(sig(0).degree(), 1);
  }

  #[test]
  fn degree_addition_takes_maximum() {
    let linear = sig(0) + sig(1);
    assert_eq!(linear.degree(), 1, "x + y should have degree 1");

    let mixed = sig(0) + sig(0) * sig(1);
    assert_eq!(mixed.degree(), 2, "x + (x * y) should have degree 2");
  }

  #[test]
  fn degree_multiplication_sums_factors() {
    assert_eq!((sig(0) * sig(1)).degree(), 2, "x * y should have degree 2");
    assert_eq!((sig(0) * sig(1) * sig(1)).degree(), 3, "x * y * y should have degree 3");

    // Constants do not contribute
    let scaled = Expression::constant(F17::from(3)) * sig(0) * sig(1);
    assert_eq!(scaled.degree(), 2);
  }

  #[test]
  fn checked_mul_rejects_cubic_products() {
    let quadratic = sig(0) * sig(1);
    let err = quadratic.checked_mul(sig(2)).unwrap_err();
    assert_eq!(err, CircuitError::DegreeExceeded { degree: 3 });
  }

  #[test]
  fn const_value_folds_constant_trees() {
    let expr = (Expression::constant(F17::from(2)) + Expression::constant(F17::from(3)))
      * Expression::constant(F17::from(4));
    assert_eq!(expr.const_value(), Some(F17::from(20 % 17)));
    assert_eq!((sig(0) + Expression::constant(F17::ONE)).const_value(), None);
  }

  #[test]
  fn division_by_constant_folds_to_inverse() {
    let divided = sig(0).div(&Expression::constant(F17::from(4))).unwrap();
    // 4 * 13 = 52 = 1 mod 17
    let expected = sig(0).scale(F17::from(13));
    assert_eq!(divided, expected);
  }

  #[test]
  fn division_errors() {
    assert_eq!(sig(0).div(&sig(1)).unwrap_err(), CircuitError::DivisionBySignal);
    assert_eq!(
      sig(0).div(&Expression::zero()).unwrap_err(),
      CircuitError::DivisionByZero,
      "zero divisor must fail at compile time"
    );
  }

  #[test]
  fn signal_collection_is_deduplicated() {
    let expr = sig(2) * sig(0) + sig(2) + sig(1);
    let ids: Vec<_> = expr.signals().into_iter().collect();
    assert_eq!(ids, vec![SignalId(0), SignalId(1), SignalId(2)]);
  }
}
