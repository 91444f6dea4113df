//! Compile-time variables and their symbolic promotion.
//!
//! A [`Var`] starts as a concrete host integer and may be used for loop
//! bounds, array sizes, and arbitrary host arithmetic. The instant a value
//! derived from a signal flows into it, it becomes symbolic: it then
//! carries an [`Expression`] (and with it a degree and read set), and every
//! host-only operation on it fails rather than silently depending on a
//! witness value.

use super::*;

/// A mutable template variable: concrete until touched by a signal.
#[derive(Clone, Debug)]
pub enum Var<F: PrimeField> {
  /// A host integer, fully known at compile time.
  Concrete(i128),
  /// A value derived (possibly transitively) from signals.
  Symbolic(Expression<F>),
}

impl<F: PrimeField> Var<F> {
  /// Whether this variable has been promoted to symbolic.
  pub fn is_symbolic(&self) -> bool {
    matches!(self, Self::Symbolic(_))
  }

  /// Converts a host integer to a field element.
  fn lift(value: i128) -> F {
    if value < 0 {
      -F::from(value.unsigned_abs())
    } else {
      F::from(value as u128)
    }
  }

  /// The variable as an expression, lifting concrete values to constants.
  pub fn into_expr(self) -> Expression<F> {
    match self {
      Self::Concrete(value) => Expression::Constant(Self::lift(value)),
      Self::Symbolic(expr) => expr,
    }
  }

  /// Structural degree: 0 while concrete.
  pub fn degree(&self) -> usize {
    match self {
      Self::Concrete(_) => 0,
      Self::Symbolic(expr) => expr.degree(),
    }
  }

  /// Extracts a loop bound or array size.
  ///
  /// Control structure may only depend on compile-time values, so a
  /// symbolic variable here is a staticity violation, not a conversion
  /// problem.
  pub fn try_usize(&self) -> Result<usize> {
    match self {
      Self::Concrete(value) => usize::try_from(*value)
        .map_err(|_| CircuitError::InvalidConfig(format!("`{value}` is not a valid size"))),
      Self::Symbolic(_) => Err(CircuitError::StaticityViolation),
    }
  }

  /// Requires both operands concrete for a host-only operation.
  fn host_pair(&self, rhs: &Self, op: &'static str) -> Result<(i128, i128)> {
    match (self, rhs) {
      (Self::Concrete(a), Self::Concrete(b)) => Ok((*a, *b)),
      _ => Err(CircuitError::UnsupportedOnSignal { op }),
    }
  }

  /// Host remainder; not defined once symbolic.
  pub fn rem(&self, rhs: &Self) -> Result<Self> {
    let (a, b) = self.host_pair(rhs, "%")?;
    if b == 0 {
      return Err(CircuitError::DivisionByZero);
    }
    Ok(Self::Concrete(a % b))
  }

  /// Host left shift; not defined once symbolic.
  pub fn shl(&self, rhs: &Self) -> Result<Self> {
    let (a, b) = self.host_pair(rhs, "<<")?;
    Ok(Self::Concrete(a << b))
  }

  /// Host right shift; not defined once symbolic.
  pub fn shr(&self, rhs: &Self) -> Result<Self> {
    let (a, b) = self.host_pair(rhs, ">>")?;
    Ok(Self::Concrete(a >> b))
  }

  /// Host less-than; not defined once symbolic.
  pub fn lt(&self, rhs: &Self) -> Result<bool> {
    let (a, b) = self.host_pair(rhs, "<")?;
    Ok(a < b)
  }

  /// Host greater-than; not defined once symbolic.
  pub fn gt(&self, rhs: &Self) -> Result<bool> {
    let (a, b) = self.host_pair(rhs, ">")?;
    Ok(a > b)
  }
}

impl<F: PrimeField> From<u64> for Var<F> {
  fn from(value: u64) -> Self {
    Self::Concrete(i128::from(value))
  }
}

impl<F: PrimeField> From<usize> for Var<F> {
  fn from(value: usize) -> Self {
    Self::Concrete(value as i128)
  }
}

impl<F: PrimeField> From<i64> for Var<F> {
  fn from(value: i64) -> Self {
    Self::Concrete(i128::from(value))
  }
}

impl<F: PrimeField> From<Expression<F>> for Var<F> {
  fn from(expr: Expression<F>) -> Self {
    Self::Symbolic(expr)
  }
}

impl<F: PrimeField> std::ops::Add for Var<F> {
  type Output = Self;

  fn add(self, rhs: Self) -> Self::Output {
    match (self, rhs) {
      (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a + b),
      (lhs, rhs) => Self::Symbolic(lhs.into_expr() + rhs.into_expr()),
    }
  }
}

impl<F: PrimeField> std::ops::Sub for Var<F> {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self::Output {
    match (self, rhs) {
      (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a - b),
      (lhs, rhs) => Self::Symbolic(lhs.into_expr() - rhs.into_expr()),
    }
  }
}

impl<F: PrimeField> std::ops::Mul for Var<F> {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self::Output {
    match (self, rhs) {
      (Self::Concrete(a), Self::Concrete(b)) => Self::Concrete(a * b),
      (lhs, rhs) => Self::Symbolic(lhs.into_expr() * rhs.into_expr()),
    }
  }
}

impl<F: PrimeField> std::ops::Add<Expression<F>> for Var<F> {
  type Output = Self;

  fn add(self, rhs: Expression<F>) -> Self::Output {
    Self::Symbolic(self.into_expr() + rhs)
  }
}

impl<F: PrimeField> std::ops::Mul<Expression<F>> for Var<F> {
  type Output = Self;

  fn mul(self, rhs: Expression<F>) -> Self::Output {
    Self::Symbolic(self.into_expr() * rhs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{expr::SignalId, mock::F17};

  fn sig(i: usize) -> Expression<F17> {
    Expression::Signal(SignalId(i))
  }

  #[test]
  fn concrete_vars_do_host_arithmetic() {
    let a = Var::<F17>::from(14u64);
    let b = Var::from(4u64);

    assert_eq!(a.rem(&b).unwrap().try_usize().unwrap(), 2);
    assert_eq!(a.shr(&Var::from(1u64)).unwrap().try_usize().unwrap(), 7);
    assert_eq!(b.shl(&Var::from(2u64)).unwrap().try_usize().unwrap(), 16);
    assert!(b.lt(&a).unwrap());
    assert!(!a.lt(&b).unwrap());
  }

  #[test]
  fn signal_contact_promotes_to_symbolic() {
    let acc = Var::<F17>::from(3u64) + sig(0);
    assert!(acc.is_symbolic());
    assert_eq!(acc.degree(), 1);

    let product = acc * sig(1);
    assert_eq!(product.degree(), 2);
  }

  #[test]
  fn host_ops_fail_on_symbolic_vars() {
    let symbolic = Var::<F17>::from(sig(0));
    let two = Var::from(2u64);

    assert_eq!(
      symbolic.rem(&two).unwrap_err(),
      CircuitError::UnsupportedOnSignal { op: "%" }
    );
    assert_eq!(
      two.lt(&symbolic).unwrap_err(),
      CircuitError::UnsupportedOnSignal { op: "<" }
    );
    assert_eq!(symbolic.try_usize().unwrap_err(), CircuitError::StaticityViolation);
  }

  #[test]
  fn negative_concrete_values_lift_correctly() {
    let v = Var::<F17>::from(-3i64);
    assert_eq!(v.into_expr(), Expression::Constant(-F17::from(3)));
  }
}
