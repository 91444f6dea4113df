//! Equality indicators and the constrained inverse.

use super::*;

/// `out = (in == 0) ? 1 : 0`, without branching.
///
/// The advice value `inv` is the inverse of `in` where one exists and `0`
/// otherwise; the pair of constraints
///
/// ```text
/// out === 1 - in·inv
/// in·out === 0
/// ```
///
/// forces `out` to be boolean and correct. Both rows are load-bearing:
/// dropping either lets a prover pick `out` freely for some `in`.
#[derive(Clone, Copy, Debug)]
pub struct IsZero;

impl<F: PrimeField> Template<F> for IsZero {
  fn name(&self) -> &str {
    "is_zero"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    let input = cx.input("in")?;
    let out = cx.output("out")?;
    let inv = cx.intermediate("inv")?;

    cx.hint(&inv, &[&input], InverseOrZero)?;
    cx.assign(&out, Expression::one() - input.clone() * inv)?;
    cx.constrain(input * out, Expression::zero())
  }
}

/// `out = (x == y) ? 1 : 0`: the equality indicator over a difference.
#[derive(Clone, Copy, Debug)]
pub struct IsEqual;

impl<F: PrimeField> Template<F> for IsEqual {
  fn name(&self) -> &str {
    "is_equal"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    let x = cx.input("x")?;
    let y = cx.input("y")?;
    let out = cx.output("out")?;

    let diff_is_zero = cx.component("diff_is_zero", &IsZero)?;
    cx.assign(&diff_is_zero.input("in")?, x - y)?;
    cx.assign(&out, diff_is_zero.output("out")?)
  }
}

/// `out = 1 / in`, with the inverse supplied as advice and bound by
/// `in·out === 1`.
///
/// Evaluation fails with a division-by-zero error when `in = 0`; there is
/// no value the constraint could accept, and silently returning `0` would
/// mask the bug.
#[derive(Clone, Copy, Debug)]
pub struct MulInv;

impl<F: PrimeField> Template<F> for MulInv {
  fn name(&self) -> &str {
    "mul_inv"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    let input = cx.input("in")?;
    let out = cx.output("out")?;

    cx.hint(&out, &[&input], Inverse)?;
    cx.constrain(input * out, Expression::one())
  }
}

#[cfg(test)]
mod tests {
  use ark_ff::{AdditiveGroup, Field};

  use super::*;
  use crate::{builder::compile, mock::F17, witness::Inputs};

  fn indicator(x: u64, y: u64) -> F17 {
    let circuit = compile::<F17>(&IsEqual).unwrap();
    let mut inputs = Inputs::new();
    inputs.set_u64("x", x).set_u64("y", y);
    let witness = circuit.witness(&inputs).unwrap();
    witness.value(circuit.witness_column("out").unwrap())
  }

  #[test]
  fn equal_values_indicate_one() {
    assert_eq!(indicator(4, 4), F17::ONE);
    assert_eq!(indicator(0, 0), F17::ONE);
  }

  #[test]
  fn distinct_values_indicate_zero() {
    assert_eq!(indicator(4, 5), F17::ZERO);
    // Adjacent under the modulus: 0 and p - 1 differ by one, not zero.
    assert_eq!(indicator(0, 16), F17::ZERO);
    assert_eq!(indicator(16, 0), F17::ZERO);
  }

  #[test]
  fn is_zero_covers_both_cases() {
    let circuit = compile::<F17>(&IsZero).unwrap();
    let out = circuit.witness_column("out").unwrap();

    let mut inputs = Inputs::new();
    inputs.set_u64("in", 0);
    assert_eq!(circuit.witness(&inputs).unwrap().value(out), F17::ONE);

    inputs.set_u64("in", 9);
    assert_eq!(circuit.witness(&inputs).unwrap().value(out), F17::ZERO);
  }

  #[test]
  fn mul_inv_inverts_every_nonzero_element() {
    let circuit = compile::<F17>(&MulInv).unwrap();
    let out = circuit.witness_column("out").unwrap();

    for value in 1u64..17 {
      let mut inputs = Inputs::new();
      inputs.set_u64("in", value);
      let witness = circuit.witness(&inputs).unwrap();
      assert_eq!(witness.value(out) * F17::from(value), F17::ONE);
    }
  }

  #[test]
  fn mul_inv_of_zero_fails_instead_of_returning_zero() {
    let circuit = compile::<F17>(&MulInv).unwrap();
    let mut inputs = Inputs::new();
    inputs.set_u64("in", 0);
    assert_eq!(circuit.witness(&inputs).unwrap_err(), CircuitError::DivisionByZero);
  }
}
