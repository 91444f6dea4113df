//! Bit decomposition and the bounded bit-width comparator.

use super::*;

/// Decomposes `in` into `bits` little-endian bits.
///
/// Each bit arrives as advice and is constrained boolean; the weighted
/// recomposition is constrained back to the input, so the decomposition is
/// sound as long as `in` fits the width.
#[derive(Clone, Copy, Debug)]
pub struct Num2Bits {
  /// Number of output bits.
  pub bits: usize,
}

impl<F: PrimeField> Template<F> for Num2Bits {
  fn name(&self) -> &str {
    "num2bits"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    if self.bits == 0 || self.bits >= F::MODULUS_BIT_SIZE as usize {
      return Err(CircuitError::InvalidConfig(format!(
        "bit width {} does not fit the field",
        self.bits
      )));
    }

    let input = cx.input("in")?;
    let out = cx.output_array("out", self.bits)?;

    let mut recomposed = Expression::zero();
    let mut pow = F::ONE;
    for (i, bit) in out.iter().enumerate() {
      cx.hint(bit, &[&input], BitOf { bit: i })?;
      cx.constrain(bit.clone() * (bit.clone() - Expression::one()), Expression::zero())?;
      recomposed = recomposed + bit.clone().scale(pow);
      pow = pow.double();
    }
    cx.constrain(recomposed, input)
  }
}

/// `out = (a < b) ? 1 : 0` for values known to fit `bits` bits.
///
/// The comparison is the top bit of `a + 2^bits - b`: the offset cannot
/// underflow within the width, so the bit is clear exactly when `a < b`.
/// The caller must ensure both operands actually fit `bits` bits; this
/// template range-checks its own shifted difference, not its inputs.
#[derive(Clone, Copy, Debug)]
pub struct LessThan {
  /// Width of the compared values.
  pub bits: usize,
}

impl<F: PrimeField> Template<F> for LessThan {
  fn name(&self) -> &str {
    "less_than"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    if self.bits == 0 || self.bits + 1 >= F::MODULUS_BIT_SIZE as usize {
      return Err(CircuitError::InvalidConfig(format!(
        "comparison width {} does not fit the field",
        self.bits
      )));
    }

    let a = cx.input("a")?;
    let b = cx.input("b")?;
    let out = cx.output("out")?;

    let n2b = cx.component("n2b", &Num2Bits { bits: self.bits + 1 })?;
    let shift = Expression::constant(pow_of_two::<F>(self.bits));
    cx.assign(&n2b.input("in")?, a + shift - b)?;
    cx.assign(&out, Expression::one() - n2b.output_at("out", self.bits)?)
  }
}

#[cfg(test)]
mod tests {
  use ark_ff::{AdditiveGroup, Field};

  use super::*;
  use crate::{
    builder::{compile, Warning},
    mock::F1009,
    witness::Inputs,
  };

  #[test]
  fn decomposition_matches_the_binary_representation() {
    let circuit = compile::<F1009>(&Num2Bits { bits: 8 }).unwrap();

    let mut inputs = Inputs::new();
    inputs.set_u64("in", 0b1011_0010);
    let witness = circuit.witness(&inputs).unwrap();

    let bits: Vec<u64> = (0..8)
      .map(|i| {
        let col = circuit.witness_column(&format!("out[{i}]")).unwrap();
        if witness.value(col) == F1009::ONE { 1 } else { 0 }
      })
      .collect();
    assert_eq!(bits, vec![0, 1, 0, 0, 1, 1, 0, 1]);
  }

  #[test]
  fn zero_width_decomposition_is_rejected() {
    assert!(matches!(
      compile::<F1009>(&Num2Bits { bits: 0 }).unwrap_err(),
      CircuitError::InvalidConfig(_)
    ));
  }

  fn less_than(a: u64, b: u64) -> F1009 {
    let circuit = compile::<F1009>(&LessThan { bits: 8 }).unwrap();
    let mut inputs = Inputs::new();
    inputs.set_u64("a", a).set_u64("b", b);
    let witness = circuit.witness(&inputs).unwrap();
    witness.value(circuit.witness_column("out").unwrap())
  }

  #[test]
  fn comparator_orders_in_width_values() {
    assert_eq!(less_than(3, 7), F1009::ONE);
    assert_eq!(less_than(7, 3), F1009::ZERO);
    assert_eq!(less_than(5, 5), F1009::ZERO);
    assert_eq!(less_than(0, 255), F1009::ONE);
  }

  #[test]
  fn unused_decomposition_bits_are_flagged_as_dangling() {
    // The comparator only consumes the top bit; the rest are constrained
    // inside `num2bits` but never referenced by their instantiator, which
    // is exactly what the dangling-output warning reports.
    let circuit = compile::<F1009>(&LessThan { bits: 8 }).unwrap();
    let dangling: Vec<_> = circuit
      .warnings()
      .iter()
      .filter(|w| matches!(w, Warning::DanglingOutput { .. }))
      .collect();
    assert_eq!(dangling.len(), 8);
  }
}
