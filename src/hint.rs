//! Prover-side witness computations.
//!
//! A hint computes one signal's value outside the constraint system, from
//! the values of its read signals. Hints may use host operations that have
//! no constraint translation (strict inverses, bit extraction, integer
//! division); soundness then depends on the template separately
//! constraining the hinted signal, which the compiler deliberately does
//! not enforce.

use ark_ff::BigInteger;
use num_bigint::BigUint;

use super::*;
use crate::error::{CircuitError, Result};

/// A deterministic prover-side computation for one signal.
///
/// Implementations must be `Send + Sync`: compiled circuits are shared
/// across concurrent witness evaluations.
pub trait Hint<F: PrimeField>: Send + Sync {
  /// Name used in diagnostics.
  fn name(&self) -> &'static str;

  /// Computes the target value from the read signal values.
  fn evaluate(&self, reads: &[F]) -> Result<F>;
}

/// Interprets a field element as its canonical integer representative.
fn to_biguint<F: PrimeField>(value: F) -> BigUint {
  value.into_bigint().into()
}

/// Reduces an arbitrary-precision integer into the field.
fn from_biguint<F: PrimeField>(value: &BigUint) -> F {
  F::from_le_bytes_mod_order(&value.to_bytes_le())
}

/// The modular inverse, with `0 ↦ 0`.
///
/// This is the advice value of the equality-indicator pattern: when the
/// dividend is zero the indicator constraints hold for any value, and `0`
/// is the canonical choice.
#[derive(Clone, Copy, Debug)]
pub struct InverseOrZero;

impl<F: PrimeField> Hint<F> for InverseOrZero {
  fn name(&self) -> &'static str {
    "inverse_or_zero"
  }

  fn evaluate(&self, reads: &[F]) -> Result<F> {
    let [value] = reads else { panic!("inverse_or_zero reads exactly one signal") };
    Ok(value.inverse().unwrap_or(F::ZERO))
  }
}

/// The strict modular inverse; fails on zero.
#[derive(Clone, Copy, Debug)]
pub struct Inverse;

impl<F: PrimeField> Hint<F> for Inverse {
  fn name(&self) -> &'static str {
    "inverse"
  }

  fn evaluate(&self, reads: &[F]) -> Result<F> {
    let [value] = reads else { panic!("inverse reads exactly one signal") };
    value.inverse().ok_or(CircuitError::DivisionByZero)
  }
}

/// Bit `bit` of the canonical integer representative.
#[derive(Clone, Copy, Debug)]
pub struct BitOf {
  /// Which bit to extract, counting from the least significant.
  pub bit: usize,
}

impl<F: PrimeField> Hint<F> for BitOf {
  fn name(&self) -> &'static str {
    "bit_of"
  }

  fn evaluate(&self, reads: &[F]) -> Result<F> {
    let [value] = reads else { panic!("bit_of reads exactly one signal") };
    Ok(if value.into_bigint().get_bit(self.bit) { F::ONE } else { F::ZERO })
  }
}

/// Integer (floor) quotient of the two reads' canonical representatives.
#[derive(Clone, Copy, Debug)]
pub struct IntegerQuotient;

impl<F: PrimeField> Hint<F> for IntegerQuotient {
  fn name(&self) -> &'static str {
    "integer_quotient"
  }

  fn evaluate(&self, reads: &[F]) -> Result<F> {
    let [dividend, divisor] = reads else { panic!("integer_quotient reads exactly two signals") };
    if *divisor == F::ZERO {
      return Err(CircuitError::DivisionByZero);
    }
    Ok(from_biguint(&(to_biguint(*dividend) / to_biguint(*divisor))))
  }
}
