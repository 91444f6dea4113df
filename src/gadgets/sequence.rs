//! Bounded stateful computation: unroll the whole sequence, then select.

use super::*;

/// `out = idx!` for any `idx` known only at proving time, up to a
/// compile-time `bound`.
///
/// The entire factorial table up to `bound` is computed and constrained
/// step by step, the requested index is range-checked against the table,
/// and the quin selector extracts the entry. Every step is constrained
/// even when a smaller index is requested: cost is linear in `bound`
/// regardless of `idx`. That is the price of data-dependent iteration in
/// a fixed topology, not an inefficiency to optimize away.
#[derive(Clone, Copy, Debug)]
pub struct BoundedFactorial {
  /// Largest representable index.
  pub bound: usize,
  /// Bit width for the range check; `idx` and `bound + 1` must fit.
  pub bits:  usize,
}

impl<F: PrimeField> Template<F> for BoundedFactorial {
  fn name(&self) -> &str {
    "bounded_factorial"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    let idx = cx.input("idx")?;
    let out = cx.output("out")?;

    // The full table: seq[0] = 1, seq[i] = i * seq[i-1].
    let table = cx.intermediate_array("seq", self.bound + 1)?;
    cx.assign(&table[0], Expression::one())?;
    for i in 1..=self.bound {
      cx.assign(&table[i], table[i - 1].clone().scale(F::from(i as u64)))?;
    }

    // idx < bound + 1, or no table entry answers the query.
    let range = cx.component("range", &LessThan { bits: self.bits })?;
    cx.assign(&range.input("a")?, idx.clone())?;
    cx.assign(
      &range.input("b")?,
      Expression::constant(F::from((self.bound + 1) as u64)),
    )?;
    cx.constrain(range.output("out")?, Expression::one())?;

    let select = cx.component("select", &QuinSelector { n: self.bound + 1 })?;
    for (i, entry) in table.iter().enumerate() {
      cx.assign(&select.input_at("in", i)?, entry.clone())?;
    }
    cx.assign(&select.input("idx")?, idx)?;
    cx.assign(&out, select.output("out")?)
  }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;
  use crate::{builder::compile, mock::F1009, witness::Inputs};

  fn factorial(idx: u64) -> crate::error::Result<F1009> {
    let circuit = compile::<F1009>(&BoundedFactorial { bound: 5, bits: 4 }).unwrap();
    let mut inputs = Inputs::new();
    inputs.set_u64("idx", idx);
    let witness = circuit.witness(&inputs)?;
    Ok(witness.value(circuit.witness_column("out").unwrap()))
  }

  #[rstest]
  #[case(0, 1)]
  #[case(1, 1)]
  #[case(3, 6)]
  #[case(5, 120)]
  fn computes_factorials_up_to_the_bound(#[case] idx: u64, #[case] expected: u64) {
    assert_eq!(factorial(idx).unwrap(), F1009::from(expected));
  }

  #[test]
  fn indices_beyond_the_bound_fail_the_range_check() {
    assert!(matches!(
      factorial(6).unwrap_err(),
      CircuitError::ConstraintUnsatisfied { .. }
    ));
  }

  #[test]
  fn every_step_is_constrained_even_for_small_indices() {
    let circuit = compile::<F1009>(&BoundedFactorial { bound: 5, bits: 4 }).unwrap();
    // The table rows exist regardless of which index an instance asks
    // for: one row per step plus the range check and selector machinery.
    assert!(circuit.r1cs().num_constraints() > 6);

    let seq3 = circuit.witness_column("seq[3]").unwrap();
    let mut inputs = Inputs::new();
    inputs.set_u64("idx", 0);
    let witness = circuit.witness(&inputs).unwrap();
    assert_eq!(witness.value(seq3), F1009::from(6));
  }
}
