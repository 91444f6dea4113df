//! The compiled Rank-1 Constraint System.
//!
//! Each constraint is one row `(A·w) * (B·w) = C·w` over the witness vector
//! `w`, whose position 0 holds the constant `1`. Rows are appended in
//! emission order and never reordered or removed; external tooling relies
//! on stable row and column indices.

use std::collections::BTreeMap;

use super::*;
use crate::{
  error::{CircuitError, Result},
  expr::{Expression, SignalId},
  matrix::SparseMatrix,
};

/// A linear combination of witness columns.
///
/// Column 0 is the constant-one entry of the witness vector, so constants
/// need no separate field; a pure constant `k` is the single term `(0, k)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearCombination<F: PrimeField> {
  /// Non-zero coefficients keyed by witness column.
  terms: BTreeMap<usize, F>,
}

impl<F: PrimeField> LinearCombination<F> {
  /// The empty (zero) combination.
  pub fn zero() -> Self {
    Self::default()
  }

  /// A constant `k`, as coefficient on the constant-one column.
  pub fn constant(k: F) -> Self {
    let mut lc = Self::zero();
    lc.add_term(0, k);
    lc
  }

  /// A single signal with coefficient 1.
  pub fn from_signal(id: SignalId) -> Self {
    let mut lc = Self::zero();
    lc.add_term(id.witness_column(), F::ONE);
    lc
  }

  /// Adds `coeff` onto the coefficient of `col`, dropping the term if the
  /// result is zero.
  pub fn add_term(&mut self, col: usize, coeff: F) {
    let entry = self.terms.entry(col).or_insert(F::ZERO);
    *entry += coeff;
    if *entry == F::ZERO {
      self.terms.remove(&col);
    }
  }

  /// The constant value if no signal column carries a coefficient.
  pub fn const_value(&self) -> Option<F> {
    if self.terms.keys().any(|&col| col != 0) {
      return None;
    }
    Some(self.terms.get(&0).copied().unwrap_or(F::ZERO))
  }

  /// Scales every coefficient by `k`.
  pub fn scale(mut self, k: F) -> Self {
    if k == F::ZERO {
      return Self::zero();
    }
    for coeff in self.terms.values_mut() {
      *coeff *= k;
    }
    self
  }

  /// Evaluates against a witness vector.
  pub fn eval(&self, witness: &[F]) -> F {
    self.terms.iter().map(|(&col, &coeff)| coeff * witness[col]).sum()
  }

  /// Iterates `(column, coefficient)` pairs in column order.
  pub fn iter(&self) -> impl Iterator<Item = (usize, F)> + '_ {
    self.terms.iter().map(|(&col, &coeff)| (col, coeff))
  }

  /// Signal columns referenced by this combination (column 0 excluded).
  pub fn signal_columns(&self) -> impl Iterator<Item = usize> + '_ {
    self.terms.keys().copied().filter(|&col| col != 0)
  }
}

impl<F: PrimeField> std::ops::Add for LinearCombination<F> {
  type Output = Self;

  fn add(mut self, rhs: Self) -> Self::Output {
    for (col, coeff) in rhs.terms {
      self.add_term(col, coeff);
    }
    self
  }
}

impl<F: PrimeField> std::ops::Neg for LinearCombination<F> {
  type Output = Self;

  fn neg(self) -> Self::Output {
    self.scale(-F::ONE)
  }
}

impl<F: PrimeField> std::ops::Sub for LinearCombination<F> {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self::Output {
    self + (-rhs)
  }
}

/// Quadratic normal form `A·B + C` with `A`, `B`, `C` linear.
///
/// This is where the quadratic limit is enforced: an expression lowers to
/// at most one product of two linear combinations plus a linear remainder,
/// matching exactly what one R1CS row can hold. Combinations that would
/// need a second product, or degree above 2, fail with
/// [`CircuitError::DegreeExceeded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuadraticForm<F: PrimeField> {
  /// The single permitted signal-signal product, if any.
  product: Option<(LinearCombination<F>, LinearCombination<F>)>,
  /// The linear remainder.
  linear:  LinearCombination<F>,
}

impl<F: PrimeField> QuadraticForm<F> {
  /// The zero form.
  fn zero() -> Self {
    Self { product: None, linear: LinearCombination::zero() }
  }

  /// Lowers an expression tree into normal form.
  pub fn from_expression(expr: &Expression<F>) -> Result<Self> {
    let degree = expr.degree();
    if degree > 2 {
      return Err(CircuitError::DegreeExceeded { degree });
    }
    Self::lower(expr)
  }

  /// Structural lowering; degree has already been bounded.
  fn lower(expr: &Expression<F>) -> Result<Self> {
    match expr {
      Expression::Constant(c) => {
        Ok(Self { product: None, linear: LinearCombination::constant(*c) })
      },
      Expression::Signal(id) => {
        Ok(Self { product: None, linear: LinearCombination::from_signal(*id) })
      },
      Expression::Add(terms) => {
        let mut acc = Self::zero();
        for term in terms {
          acc = acc.add(Self::lower(term)?)?;
        }
        Ok(acc)
      },
      Expression::Mul(factors) => {
        let mut acc = Self { product: None, linear: LinearCombination::constant(F::ONE) };
        for factor in factors {
          acc = acc.mul(Self::lower(factor)?)?;
        }
        Ok(acc)
      },
    }
  }

  /// Sum of two forms; at most one may carry a product.
  fn add(mut self, rhs: Self) -> Result<Self> {
    match (&self.product, rhs.product) {
      (Some(_), Some(_)) => Err(CircuitError::DegreeExceeded { degree: 2 }),
      (None, product @ Some(_)) => {
        self.product = product;
        self.linear = self.linear + rhs.linear;
        Ok(self)
      },
      (_, None) => {
        self.linear = self.linear + rhs.linear;
        Ok(self)
      },
    }
  }

  /// Product of two forms.
  ///
  /// Constant factors scale; two signal-bearing linear factors form the
  /// product pair; anything deeper is over the quadratic limit.
  fn mul(self, rhs: Self) -> Result<Self> {
    // Constant on either side scales the other form.
    if self.product.is_none() {
      if let Some(k) = self.linear.const_value() {
        return Ok(rhs.scale(k));
      }
    }
    if rhs.product.is_none() {
      if let Some(k) = rhs.linear.const_value() {
        return Ok(self.scale(k));
      }
    }

    match (self.product.is_some(), rhs.product.is_some()) {
      (false, false) => {
        Ok(Self { product: Some((self.linear, rhs.linear)), linear: LinearCombination::zero() })
      },
      (true, false) | (false, true) => Err(CircuitError::DegreeExceeded { degree: 3 }),
      (true, true) => Err(CircuitError::DegreeExceeded { degree: 4 }),
    }
  }

  /// Scales the whole form by a constant.
  fn scale(mut self, k: F) -> Self {
    if let Some((a, b)) = self.product {
      if k == F::ZERO {
        self.product = None;
      } else {
        self.product = Some((a, b.scale(k)));
      }
    }
    self.linear = self.linear.scale(k);
    self
  }

  /// Negates the form.
  fn neg(self) -> Self {
    self.scale(-F::ONE)
  }

  /// Difference of two forms; subject to the same one-product limit.
  pub fn sub(self, rhs: Self) -> Result<Self> {
    self.add(rhs.neg())
  }

  /// Splits into `(A, B, C)` parts, with empty `A`/`B` when no product
  /// exists. The represented value is `A·B + C`.
  pub fn into_parts(self) -> (LinearCombination<F>, LinearCombination<F>, LinearCombination<F>) {
    match self.product {
      Some((a, b)) => (a, b, self.linear),
      None => (LinearCombination::zero(), LinearCombination::zero(), self.linear),
    }
  }
}

/// One R1CS row: `(A·w) * (B·w) = C·w`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint<F: PrimeField> {
  /// Left factor.
  pub a: LinearCombination<F>,
  /// Right factor.
  pub b: LinearCombination<F>,
  /// Result side.
  pub c: LinearCombination<F>,
}

impl<F: PrimeField> Constraint<F> {
  /// Checks this row against a witness vector.
  pub fn is_satisfied(&self, witness: &[F]) -> bool {
    self.a.eval(witness) * self.b.eval(witness) == self.c.eval(witness)
  }
}

/// The full constraint system of a compiled circuit.
///
/// Fixed once compilation finishes; evaluation never mutates it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct R1cs<F: PrimeField> {
  /// Rows in emission order.
  pub(crate) constraints: Vec<Constraint<F>>,
  /// Length of the witness vector, including the constant-one entry.
  pub(crate) witness_len: usize,
}

impl<F: PrimeField> R1cs<F> {
  /// Number of constraint rows.
  pub fn num_constraints(&self) -> usize {
    self.constraints.len()
  }

  /// Length of the witness vector, including the constant-one entry.
  pub fn witness_len(&self) -> usize {
    self.witness_len
  }

  /// The rows in emission order.
  pub fn constraints(&self) -> &[Constraint<F>] {
    &self.constraints
  }

  /// Materializes the `(A, B, C)` matrix triple, one row per constraint.
  pub fn matrices(&self) -> (SparseMatrix<F>, SparseMatrix<F>, SparseMatrix<F>) {
    let rows = self.constraints.len();
    let mut a = SparseMatrix::new_rows_cols(rows, self.witness_len);
    let mut b = SparseMatrix::new_rows_cols(rows, self.witness_len);
    let mut c = SparseMatrix::new_rows_cols(rows, self.witness_len);

    for (row, constraint) in self.constraints.iter().enumerate() {
      for (col, coeff) in constraint.a.iter() {
        a.write(row, col, coeff);
      }
      for (col, coeff) in constraint.b.iter() {
        b.write(row, col, coeff);
      }
      for (col, coeff) in constraint.c.iter() {
        c.write(row, col, coeff);
      }
    }

    (a, b, c)
  }

  /// Verifies a witness against every row, reporting the first failure.
  pub fn check(&self, witness: &[F]) -> Result<()> {
    let (a, b, c) = self.matrices();
    let az = a.mul_vector(witness);
    let bz = b.mul_vector(witness);
    let cz = c.mul_vector(witness);

    for row in 0..self.constraints.len() {
      if az[row] * bz[row] != cz[row] {
        return Err(CircuitError::ConstraintUnsatisfied { row });
      }
    }
    Ok(())
  }
}

impl<F: PrimeField> Display for R1cs<F> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "R1CS: {} constraints over {} witness entries",
      self.constraints.len(),
      self.witness_len
    )?;
    let (a, b, c) = self.matrices();
    for (label, matrix) in [("A", &a), ("B", &b), ("C", &c)] {
      writeln!(f, "{label} =")?;
      write!(f, "{matrix}")?;
    }
    Ok(())
  }
}
