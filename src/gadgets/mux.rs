//! The quin selector: runtime indexing as an indicator-weighted sum.

use super::*;

/// Selects `in[idx]` from `n` candidates with a signal-valued index.
///
/// One `IsZero` instance per position produces the indicator
/// `sel[i] = (idx == i)`; each entry is gated through its own product
/// signal and `out` is the sum of the gated entries. The selector also
/// constrains the indicator sum to 1: without that row a prover could
/// zero every indicator and make `out` equal `0` regardless of `idx`.
///
/// The selector does not bound `idx` by itself: for `idx` outside
/// `[0, n)` every indicator is honestly zero and the sum row cannot be
/// satisfied. Callers that need a clean error boundary should range-check
/// `idx` separately (see [`LessThan`](super::LessThan)).
#[derive(Clone, Debug)]
pub struct QuinSelector {
  /// Number of selectable entries.
  pub n: usize,
}

impl<F: PrimeField> Template<F> for QuinSelector {
  fn name(&self) -> &str {
    "quin_selector"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    if self.n == 0 {
      return Err(CircuitError::InvalidConfig("cannot select from zero entries".into()));
    }

    let entries = cx.input_array("in", self.n)?;
    let idx = cx.input("idx")?;
    let out = cx.output("out")?;
    let gated = cx.intermediate_array("gated", self.n)?;

    let mut indicators = cx.components("sel", self.n);
    let mut selector_sum = Expression::zero();
    let mut total = Expression::zero();
    for (i, entry) in entries.iter().enumerate() {
      let indicator = indicators.set(cx, i, &IsZero)?;
      cx.assign(
        &indicator.input("in")?,
        idx.clone() - Expression::constant(F::from(i as u64)),
      )?;
      let sel = indicator.output::<F>("out")?;

      cx.assign(&gated[i], sel.clone() * entry.clone())?;
      selector_sum = selector_sum + sel;
      total = total + gated[i].clone();
    }

    cx.constrain(selector_sum, Expression::one())?;
    cx.assign(&out, total)
  }
}

#[cfg(test)]
mod tests {
  use ark_ff::AdditiveGroup;
  use rstest::rstest;

  use super::*;
  use crate::{builder::compile, mock::F1009, witness::Inputs};

  const ENTRIES: [u64; 5] = [40, 51, 62, 73, 84];

  fn select_inputs(idx: u64) -> Inputs<F1009> {
    let mut inputs = Inputs::new();
    for (i, v) in ENTRIES.into_iter().enumerate() {
      inputs.set_u64(&format!("in[{i}]"), v);
    }
    inputs.set_u64("idx", idx);
    inputs
  }

  #[rstest]
  #[case(0)]
  #[case(1)]
  #[case(2)]
  #[case(3)]
  #[case(4)]
  fn selects_the_indexed_entry(#[case] idx: u64) {
    let circuit = compile::<F1009>(&QuinSelector { n: 5 }).unwrap();
    let witness = circuit.witness(&select_inputs(idx)).unwrap();
    let out = circuit.witness_column("out").unwrap();
    assert_eq!(witness.value(out), F1009::from(ENTRIES[idx as usize]));
  }

  #[test]
  fn out_of_range_index_cannot_satisfy_the_selector_sum() {
    let circuit = compile::<F1009>(&QuinSelector { n: 5 }).unwrap();
    let err = circuit.witness(&select_inputs(5)).unwrap_err();
    assert!(matches!(err, CircuitError::ConstraintUnsatisfied { .. }));
  }

  /// The selector with its `Σ sel === 1` row omitted: unsound on purpose.
  struct UnsoundSelector {
    n: usize,
  }

  impl<F: PrimeField> Template<F> for UnsoundSelector {
    fn name(&self) -> &str {
      "unsound_selector"
    }

    fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
      let entries = cx.input_array("in", self.n)?;
      let idx = cx.input("idx")?;
      let out = cx.output("out")?;
      let gated = cx.intermediate_array("gated", self.n)?;

      let mut indicators = cx.components("sel", self.n);
      let mut total = Expression::zero();
      for (i, entry) in entries.iter().enumerate() {
        let indicator = indicators.set(cx, i, &IsZero)?;
        cx.assign(
          &indicator.input("in")?,
          idx.clone() - Expression::constant(F::from(i as u64)),
        )?;
        cx.assign(&gated[i], indicator.output::<F>("out")? * entry.clone())?;
        total = total + gated[i].clone();
      }
      cx.assign(&out, total)
    }
  }

  #[test]
  fn omitting_the_sum_row_is_exploitable() {
    // With every indicator zero, all remaining rows hold and `out` is 0
    // no matter what the array contains: an out-of-range index silently
    // "selects" nothing instead of failing.
    let circuit = compile::<F1009>(&UnsoundSelector { n: 5 }).unwrap();
    let witness = circuit.witness(&select_inputs(5)).unwrap();
    let out = circuit.witness_column("out").unwrap();
    assert_eq!(witness.value(out), F1009::ZERO);
    assert!(circuit.r1cs().check(witness.values()).is_ok());
  }
}
